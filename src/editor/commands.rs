//! Typed edit commands.
//!
//! Each command names one editable field of the content document and
//! resolves to a [`FieldPath`] update on the draft. Raw path updates stay
//! available for anything not covered here.

use serde_json::{Map, Value};

use super::draft::{Draft, FieldPath, PathError};

/// Social network profile links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SocialNetwork {
    Instagram,
    Facebook,
    Twitter,
}

impl SocialNetwork {
    fn key(self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::Facebook => "facebook",
            Self::Twitter => "twitter",
        }
    }
}

/// Home page sections that carry a title and subtitle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum HomeSectionKey {
    WhosTraveling,
    FeaturedDestinations,
    WhatCallsToYou,
    RemarkableExperiences,
}

impl HomeSectionKey {
    fn key(self) -> &'static str {
        match self {
            Self::WhosTraveling => "whosTraveling",
            Self::FeaturedDestinations => "featuredDestinations",
            Self::WhatCallsToYou => "whatCallsToYou",
            Self::RemarkableExperiences => "remarkableExperiences",
        }
    }
}

/// Experience groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExperienceGroup {
    Who,
    What,
    Remarkable,
}

impl ExperienceGroup {
    fn key(self) -> &'static str {
        match self {
            Self::Who => "who",
            Self::What => "what",
            Self::Remarkable => "remarkable",
        }
    }
}

/// Text fields of an experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExperienceField {
    Title,
    Description,
    LongDescription,
    Link,
    Image,
}

impl ExperienceField {
    fn key(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::LongDescription => "longDescription",
            Self::Link => "link",
            Self::Image => "image",
        }
    }
}

/// Text fields of a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DestinationField {
    Region,
    Description,
    Image,
}

impl DestinationField {
    fn key(self) -> &'static str {
        match self {
            Self::Region => "region",
            Self::Description => "description",
            Self::Image => "image",
        }
    }
}

/// A single field edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    SiteName(String),
    SiteTagline(String),
    SiteDescription(String),
    CompanyEmail(String),
    CompanyPhone(String),
    Social {
        network: SocialNetwork,
        url: String,
    },

    HeroTitle(String),
    HeroSubtitle(String),
    HeroDescription(String),
    HeroPrimaryCtaLabel(String),
    HeroSecondaryCtaLabel(String),
    /// Title and subtitle of a home section; `None` leaves the part as is.
    HomeSection {
        section: HomeSectionKey,
        title: Option<String>,
        subtitle: Option<String>,
    },
    FinalCtaTitle(String),
    FinalCtaDescription(String),
    FinalCtaLabel(String),

    AboutHeroTitle(String),
    AboutHeroSubtitle(String),
    AboutParagraph {
        index: usize,
        text: String,
    },
    PhilosophyValue {
        index: usize,
        title: Option<String>,
        description: Option<String>,
    },

    Destination {
        index: usize,
        field: DestinationField,
        text: String,
    },
    /// Comma-separated country list; entries are trimmed.
    DestinationCountries {
        index: usize,
        countries: String,
    },
    /// Sets a country's page link, or removes it when `link` is empty.
    CountryLink {
        index: usize,
        country: String,
        link: String,
    },
    Experience {
        group: ExperienceGroup,
        index: usize,
        field: ExperienceField,
        text: String,
    },

    FooterBrandName(String),
    FooterDescription(String),
    NewsletterTitle(String),
    NewsletterDescription(String),
    FooterCopyright(String),
}

fn at(parts: &[&str]) -> FieldPath {
    FieldPath::from(parts)
}

impl EditCommand {
    /// Resolves the command into a path update against `draft`.
    pub fn resolve(self, draft: &Draft) -> Result<Vec<(FieldPath, Value)>, PathError> {
        let single = |path: FieldPath, text: String| -> Result<_, PathError> {
            Ok(vec![(path, Value::String(text))])
        };

        match self {
            Self::SiteName(t) => single(at(&["site", "name"]), t),
            Self::SiteTagline(t) => single(at(&["site", "tagline"]), t),
            Self::SiteDescription(t) => single(at(&["site", "description"]), t),
            Self::CompanyEmail(t) => single(at(&["site", "companyInfo", "email"]), t),
            Self::CompanyPhone(t) => single(at(&["site", "companyInfo", "phone"]), t),
            Self::Social { network, url } => single(at(&["site", "social", network.key()]), url),

            Self::HeroTitle(t) => single(at(&["home", "hero", "title"]), t),
            Self::HeroSubtitle(t) => single(at(&["home", "hero", "subtitle"]), t),
            Self::HeroDescription(t) => single(at(&["home", "hero", "description"]), t),
            Self::HeroPrimaryCtaLabel(t) => {
                single(at(&["home", "hero", "primaryCta", "label"]), t)
            }
            Self::HeroSecondaryCtaLabel(t) => {
                single(at(&["home", "hero", "secondaryCta", "label"]), t)
            }
            Self::HomeSection {
                section,
                title,
                subtitle,
            } => {
                let base = at(&["home", section.key()]);
                let mut updates = Vec::new();
                if let Some(t) = title {
                    updates.push((base.clone().key("title"), Value::String(t)));
                }
                if let Some(s) = subtitle {
                    updates.push((base.key("subtitle"), Value::String(s)));
                }
                Ok(updates)
            }
            Self::FinalCtaTitle(t) => single(at(&["home", "finalCta", "title"]), t),
            Self::FinalCtaDescription(t) => single(at(&["home", "finalCta", "description"]), t),
            Self::FinalCtaLabel(t) => single(at(&["home", "finalCta", "ctaLabel"]), t),

            Self::AboutHeroTitle(t) => single(at(&["about", "hero", "title"]), t),
            Self::AboutHeroSubtitle(t) => single(at(&["about", "hero", "subtitle"]), t),
            Self::AboutParagraph { index, text } => single(
                at(&["about", "whatWereAbout", "paragraphs"]).index(index),
                text,
            ),
            Self::PhilosophyValue {
                index,
                title,
                description,
            } => {
                let base = at(&["about", "philosophy", "values"]).index(index);
                let mut updates = Vec::new();
                if let Some(t) = title {
                    updates.push((base.clone().key("title"), Value::String(t)));
                }
                if let Some(d) = description {
                    updates.push((base.key("description"), Value::String(d)));
                }
                Ok(updates)
            }

            Self::Destination { index, field, text } => {
                single(at(&["destinations"]).index(index).key(field.key()), text)
            }
            Self::DestinationCountries { index, countries } => {
                let list = countries
                    .split(',')
                    .map(|c| Value::String(c.trim().to_string()))
                    .collect();
                Ok(vec![(
                    at(&["destinations"]).index(index).key("countries"),
                    Value::Array(list),
                )])
            }
            Self::CountryLink {
                index,
                country,
                link,
            } => {
                let destination = at(&["destinations"]).index(index);
                let links_path = destination.clone().key("countryLinks");
                if draft.get(&destination).is_none() {
                    return Err(PathError::Unresolved {
                        path: links_path.to_string(),
                        at: index.to_string(),
                    });
                }

                let mut links = match draft.get(&links_path) {
                    Some(Value::Object(map)) => map.clone(),
                    _ => Map::new(),
                };
                if link.is_empty() {
                    links.remove(&country);
                } else {
                    links.insert(country, Value::String(link));
                }
                Ok(vec![(links_path, Value::Object(links))])
            }
            Self::Experience {
                group,
                index,
                field,
                text,
            } => single(
                at(&["experiences", group.key()])
                    .index(index)
                    .key(field.key()),
                text,
            ),

            Self::FooterBrandName(t) => single(at(&["footer", "brandName"]), t),
            Self::FooterDescription(t) => single(at(&["footer", "description"]), t),
            Self::NewsletterTitle(t) => single(at(&["footer", "newsletter", "title"]), t),
            Self::NewsletterDescription(t) => {
                single(at(&["footer", "newsletter", "description"]), t)
            }
            Self::FooterCopyright(t) => single(at(&["footer", "copyright"]), t),
        }
    }
}
