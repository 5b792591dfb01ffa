//! Content document data structures.
//!
//! The whole website is driven by one JSON document (`content.json`). These
//! types mirror its shape so readers get typed access; the editor works on
//! the untyped JSON tree and re-validates against these types before saving.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Root of the site content tree.
///
/// Each page reads a disjoint subtree. The document is replaced wholesale on
/// every save; it is never partially persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDocument {
    /// Company identity and contact details
    pub site: SiteConfig,
    /// Header navigation
    pub navigation: NavigationConfig,
    /// Destination regions
    pub destinations: Vec<Destination>,
    /// Experiences grouped by audience and type
    pub experiences: ExperiencesConfig,
    /// Home page sections
    pub home: HomeConfig,
    /// About page sections
    pub about: AboutConfig,
    /// Contact page sections
    pub contact: ContactConfig,
    /// Site footer
    pub footer: FooterConfig,
    /// Requests collected in the editor, persisted on save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_requests: Option<Vec<FeatureRequest>>,
}

impl ContentDocument {
    /// Parses a document from JSON text.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Converts an untyped JSON tree into a document.
    pub fn from_value(value: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// Converts the document into an untyped JSON tree.
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    /// Looks up an experience by slug across all three groups.
    pub fn find_experience(&self, slug: &str) -> Option<&Experience> {
        self.experiences
            .who
            .iter()
            .chain(&self.experiences.what)
            .chain(&self.experiences.remarkable)
            .find(|e| e.slug == slug)
    }

    /// Looks up a destination by slug.
    pub fn find_destination(&self, slug: &str) -> Option<&Destination> {
        self.destinations.iter().find(|d| d.slug == slug)
    }
}

/// Company identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    /// Brand name (e.g., "Raou Travel")
    pub name: String,
    /// Short tagline
    pub tagline: String,
    /// Meta description
    pub description: String,
    /// Legal and contact details
    pub company_info: CompanyInfo,
    /// Social profile URLs
    pub social: SocialLinks,
}

/// Legal and contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    /// Registered company name
    pub full_name: String,
    /// Office cities
    pub locations: Vec<String>,
    /// Contact email
    pub email: String,
    /// Contact phone
    pub phone: String,
}

/// Social profile URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    /// Instagram URL
    pub instagram: String,
    /// Facebook URL
    pub facebook: String,
    /// Twitter URL
    pub twitter: String,
}

/// A label + route pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Visible text
    pub label: String,
    /// Route or URL
    pub path: String,
}

/// One header menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    /// Visible text
    pub label: String,
    /// Route
    pub path: String,
    /// Whether the entry opens a dropdown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_dropdown: Option<bool>,
}

/// Header navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationConfig {
    /// Logo asset path
    pub logo: String,
    /// Menu entries in display order
    pub menu_items: Vec<MenuItem>,
    /// Call-to-action button
    pub cta_button: Link,
}

/// A destination region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    /// Region name (e.g., "Africa")
    pub region: String,
    /// URL slug
    pub slug: String,
    /// Countries in display order
    pub countries: Vec<String>,
    /// Country name to page URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_links: Option<BTreeMap<String, String>>,
    /// Card image
    pub image: String,
    /// Card text
    pub description: String,
}

/// One experience card and its detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    /// Card title
    pub title: String,
    /// URL slug
    pub slug: String,
    /// Explicit link; computed from the slug when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Icon name
    pub icon: String,
    /// Card image
    pub image: String,
    /// Card text
    pub description: String,
    /// Detail page text
    pub long_description: String,
}

impl Experience {
    /// Route of the experience detail page.
    pub fn link(&self) -> String {
        self.link
            .clone()
            .unwrap_or_else(|| format!("/experiences/{}", self.slug))
    }
}

/// Experiences grouped by audience and type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperiencesConfig {
    /// Who's traveling (families, couples, ...)
    pub who: Vec<Experience>,
    /// What calls to you (safari, remote, ...)
    pub what: Vec<Experience>,
    /// Remarkable experiences
    pub remarkable: Vec<Experience>,
}

/// Home page hero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeHero {
    /// Background image
    pub image: String,
    /// Small text above the title
    pub subtitle: String,
    /// Headline
    pub title: String,
    /// Lead paragraph
    pub description: String,
    /// Primary button
    pub primary_cta: Link,
    /// Secondary button
    pub secondary_cta: Link,
}

/// A titled home page section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeSection {
    /// Section title
    pub title: String,
    /// Section subtitle
    pub subtitle: String,
}

/// Item in the remarkable experiences strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemarkableItem {
    /// Title
    pub title: String,
    /// Text
    pub description: String,
    /// Image
    pub image: String,
}

/// Remarkable experiences strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemarkableSection {
    /// Section title
    pub title: String,
    /// Section subtitle
    pub subtitle: String,
    /// Items in display order
    pub items: Vec<RemarkableItem>,
}

/// A text block with a call to action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CtaBlock {
    /// Title
    pub title: String,
    /// Text
    pub description: String,
    /// Button text
    pub cta_label: String,
    /// Button route
    pub cta_path: String,
}

/// Home page sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeConfig {
    /// Hero
    pub hero: HomeHero,
    /// "Who's traveling" section heading
    pub whos_traveling: HomeSection,
    /// Featured destinations heading
    pub featured_destinations: HomeSection,
    /// "What calls to you" heading
    pub what_calls_to_you: HomeSection,
    /// Remarkable experiences strip
    pub remarkable_experiences: RemarkableSection,
    /// "Why Raou" block
    pub why_raou: CtaBlock,
    /// Closing call to action
    pub final_cta: CtaBlock,
}

/// Title + description pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitledText {
    /// Title
    pub title: String,
    /// Text
    pub description: String,
}

/// About page hero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AboutHero {
    /// Headline
    pub title: String,
    /// Subtitle
    pub subtitle: String,
    /// Background image
    pub image: String,
}

/// Titled list of paragraphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphSection {
    /// Title
    pub title: String,
    /// Paragraphs in display order
    pub paragraphs: Vec<String>,
}

/// Philosophy section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Philosophy {
    /// Title
    pub title: String,
    /// Subtitle
    pub subtitle: String,
    /// Values in display order
    pub values: Vec<TitledText>,
}

/// "Why choose Raou" section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonsSection {
    /// Title
    pub title: String,
    /// Reasons in display order
    pub items: Vec<TitledText>,
}

/// About page sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutConfig {
    /// Hero
    pub hero: AboutHero,
    /// "What we're about"
    pub what_were_about: ParagraphSection,
    /// Philosophy values
    pub philosophy: Philosophy,
    /// "Why choose Raou"
    pub why_choose_raou: ReasonsSection,
    /// Commitment statement
    pub commitment: ParagraphSection,
}

/// Contact page hero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactHero {
    /// Headline
    pub title: String,
    /// Subtitle
    pub subtitle: String,
}

/// Contact form field labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFields {
    /// Name label
    pub name: String,
    /// Email label
    pub email: String,
    /// Phone label
    pub phone: String,
    /// Subject label
    pub subject: String,
    /// Message label
    pub message: String,
}

/// Contact form copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    /// Form title
    pub title: String,
    /// Field labels
    pub fields: ContactFields,
    /// Submit button text
    pub submit_button: String,
    /// Message shown after submit
    pub success_message: String,
}

/// An office address card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Office {
    /// City
    pub city: String,
    /// Street address
    pub address: String,
    /// Phone
    pub phone: String,
    /// Email
    pub email: String,
}

/// Office list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficeInfo {
    /// Title
    pub title: String,
    /// Offices in display order
    pub offices: Vec<Office>,
}

/// Contact page sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactConfig {
    /// Hero
    pub hero: ContactHero,
    /// Enquiry form
    pub form: ContactForm,
    /// Office list
    pub office_info: OfficeInfo,
}

/// A column of footer links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FooterSection {
    /// Column title
    pub title: String,
    /// Links in display order
    pub links: Vec<Link>,
}

/// Footer newsletter box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Newsletter {
    /// Title
    pub title: String,
    /// Text
    pub description: String,
    /// Input placeholder
    pub placeholder: String,
    /// Button text
    pub button_label: String,
}

/// Site footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterConfig {
    /// Brand name shown in the footer
    pub brand_name: String,
    /// Short blurb
    pub description: String,
    /// Link columns
    pub sections: Vec<FooterSection>,
    /// Newsletter box
    pub newsletter: Newsletter,
    /// Copyright line
    pub copyright: String,
}

/// Category of a feature request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestKind {
    /// New country or experience page
    NewPage,
    /// Copy change
    ContentEdit,
    /// New site feature
    NewFeature,
    /// Something is broken
    BugReport,
    /// Anything else
    Other,
}

impl RequestKind {
    /// Parses the kebab-case name used in the document.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new-page" => Some(Self::NewPage),
            "content-edit" => Some(Self::ContentEdit),
            "new-feature" => Some(Self::NewFeature),
            "bug-report" => Some(Self::BugReport),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Human-readable label.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::NewPage => "New Page (Country/Experience)",
            Self::ContentEdit => "Content Edit",
            Self::NewFeature => "New Feature",
            Self::BugReport => "Bug Report",
            Self::Other => "Other",
        }
    }
}

/// Urgency of a feature request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Nice to have
    Low,
    /// Important
    #[default]
    Medium,
    /// Urgent
    High,
}

impl Priority {
    /// Parses the lowercase name used in the document.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// A request submitted through the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRequest {
    /// Locally unique identifier
    pub id: String,
    /// Category
    #[serde(rename = "type")]
    pub kind: RequestKind,
    /// Short title
    pub title: String,
    /// Details
    pub description: String,
    /// Urgency
    pub priority: Priority,
    /// Submission timestamp (ISO 8601, millisecond precision)
    #[serde(with = "iso_millis")]
    pub date: DateTime<Utc>,
}

/// Timestamps written as `2024-01-01T00:00:00.000Z`, always with three
/// fractional digits. Any RFC 3339 form is accepted on read.
mod iso_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        DateTime::<Utc>::deserialize(deserializer)
    }
}
