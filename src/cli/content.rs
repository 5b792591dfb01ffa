//! Draft editing commands: show, set, edit, save, export and import.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde_json::Value;

use crate::cli::common::{output_json, print_notice, CliError, CliResult, Session};
use crate::editor::{
    DestinationField, EditCommand, ExperienceField, ExperienceGroup, FieldPath, HomeSectionKey,
    SocialNetwork,
};

/// Print the draft, or one field of it
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Field path (e.g., "site.name" or "about.philosophy.values[0]")
    path: Option<String>,
}

impl ShowArgs {
    /// Execute show command
    pub fn execute(&self) -> CliResult<()> {
        let mut session = Session::open()?;
        let draft = session.ready()?;

        let Some(path) = &self.path else {
            return output_json(draft.value());
        };
        let path: FieldPath = path
            .parse()
            .map_err(|e| CliError::validation(format!("{e}")))?;
        let value = draft
            .get(&path)
            .ok_or_else(|| CliError::validation(format!("No field at '{path}'")))?;
        output_json(value)
    }
}

/// Set one field of the draft
#[derive(Args, Debug)]
pub struct SetArgs {
    /// Field path (e.g., "site.name")
    path: String,

    /// New value as JSON; text that is not valid JSON is taken as a string
    value: String,

    /// Always treat the value as a string
    #[arg(long)]
    string: bool,
}

impl SetArgs {
    /// Execute set command
    pub fn execute(&self) -> CliResult<()> {
        let path: FieldPath = self
            .path
            .parse()
            .map_err(|e| CliError::validation(format!("{e}")))?;
        let value = if self.string {
            Value::String(self.value.clone())
        } else {
            serde_json::from_str(&self.value).unwrap_or_else(|_| Value::String(self.value.clone()))
        };

        let mut session = Session::open()?;
        session.ready()?;
        session.editor.update_field(&path, value)?;
        session.persist()?;

        println!("Updated {path} (run `save` to publish)");
        Ok(())
    }
}

/// Edit a named field of the draft
#[derive(Args, Debug)]
pub struct EditArgs {
    #[command(subcommand)]
    command: EditSubcommand,
}

#[derive(Subcommand, Debug)]
enum EditSubcommand {
    /// Site name
    SiteName { text: String },
    /// Site tagline
    Tagline { text: String },
    /// Site meta description
    SiteDescription { text: String },
    /// Contact email
    Email { text: String },
    /// Contact phone
    Phone { text: String },
    /// Social profile URL
    Social {
        #[arg(value_enum)]
        network: SocialNetwork,
        url: String,
    },
    /// Home hero title
    HeroTitle { text: String },
    /// Home hero subtitle
    HeroSubtitle { text: String },
    /// Home hero description
    HeroDescription { text: String },
    /// Home hero primary button label
    HeroPrimaryCta { text: String },
    /// Home hero secondary button label
    HeroSecondaryCta { text: String },
    /// Title and subtitle of a home section
    HomeSection {
        #[arg(value_enum)]
        section: HomeSectionKey,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        subtitle: Option<String>,
    },
    /// Final call-to-action title
    FinalCtaTitle { text: String },
    /// Final call-to-action description
    FinalCtaDescription { text: String },
    /// Final call-to-action button label
    FinalCtaLabel { text: String },
    /// About hero title
    AboutTitle { text: String },
    /// About hero subtitle
    AboutSubtitle { text: String },
    /// A "what we're about" paragraph
    AboutParagraph { index: usize, text: String },
    /// A philosophy value
    PhilosophyValue {
        index: usize,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// A destination's region, description or image
    Destination {
        index: usize,
        #[arg(value_enum)]
        field: DestinationField,
        text: String,
    },
    /// A destination's countries, comma separated
    Countries { index: usize, countries: String },
    /// A country's page link; empty removes it
    CountryLink {
        index: usize,
        country: String,
        link: String,
    },
    /// A field of an experience
    Experience {
        #[arg(value_enum)]
        group: ExperienceGroup,
        index: usize,
        #[arg(value_enum)]
        field: ExperienceField,
        text: String,
    },
    /// Footer brand name
    FooterBrand { text: String },
    /// Footer description
    FooterDescription { text: String },
    /// Newsletter title
    NewsletterTitle { text: String },
    /// Newsletter description
    NewsletterDescription { text: String },
    /// Copyright line
    Copyright { text: String },
}

impl From<EditSubcommand> for EditCommand {
    fn from(sub: EditSubcommand) -> Self {
        use EditSubcommand as S;
        match sub {
            S::SiteName { text } => Self::SiteName(text),
            S::Tagline { text } => Self::SiteTagline(text),
            S::SiteDescription { text } => Self::SiteDescription(text),
            S::Email { text } => Self::CompanyEmail(text),
            S::Phone { text } => Self::CompanyPhone(text),
            S::Social { network, url } => Self::Social { network, url },
            S::HeroTitle { text } => Self::HeroTitle(text),
            S::HeroSubtitle { text } => Self::HeroSubtitle(text),
            S::HeroDescription { text } => Self::HeroDescription(text),
            S::HeroPrimaryCta { text } => Self::HeroPrimaryCtaLabel(text),
            S::HeroSecondaryCta { text } => Self::HeroSecondaryCtaLabel(text),
            S::HomeSection {
                section,
                title,
                subtitle,
            } => Self::HomeSection {
                section,
                title,
                subtitle,
            },
            S::FinalCtaTitle { text } => Self::FinalCtaTitle(text),
            S::FinalCtaDescription { text } => Self::FinalCtaDescription(text),
            S::FinalCtaLabel { text } => Self::FinalCtaLabel(text),
            S::AboutTitle { text } => Self::AboutHeroTitle(text),
            S::AboutSubtitle { text } => Self::AboutHeroSubtitle(text),
            S::AboutParagraph { index, text } => Self::AboutParagraph { index, text },
            S::PhilosophyValue {
                index,
                title,
                description,
            } => Self::PhilosophyValue {
                index,
                title,
                description,
            },
            S::Destination { index, field, text } => Self::Destination { index, field, text },
            S::Countries { index, countries } => Self::DestinationCountries { index, countries },
            S::CountryLink {
                index,
                country,
                link,
            } => Self::CountryLink {
                index,
                country,
                link,
            },
            S::Experience {
                group,
                index,
                field,
                text,
            } => Self::Experience {
                group,
                index,
                field,
                text,
            },
            S::FooterBrand { text } => Self::FooterBrandName(text),
            S::FooterDescription { text } => Self::FooterDescription(text),
            S::NewsletterTitle { text } => Self::NewsletterTitle(text),
            S::NewsletterDescription { text } => Self::NewsletterDescription(text),
            S::Copyright { text } => Self::FooterCopyright(text),
        }
    }
}

impl EditArgs {
    /// Execute edit command
    pub fn execute(self) -> CliResult<()> {
        let mut session = Session::open()?;
        session.ready()?;
        session.editor.apply(self.command.into())?;
        session.persist()?;

        println!("Draft updated (run `save` to publish)");
        Ok(())
    }
}

/// Publish the draft to the site
#[derive(Args, Debug)]
pub struct SaveArgs {}

impl SaveArgs {
    /// Execute save command
    pub fn execute(&self) -> CliResult<()> {
        let mut session = Session::open()?;
        session.ready()?;
        let notice = session.editor.save()?;
        session.discard_draft()?;
        print_notice(&notice);
        Ok(())
    }
}

/// Write the draft to a local file
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output path (defaults to ./content.json)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

impl ExportArgs {
    /// Execute export command
    pub fn execute(&self) -> CliResult<()> {
        let mut session = Session::open()?;
        session.ready()?;
        let exported = session.editor.export()?;

        let path = self
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(&exported.filename));
        fs::write(&path, &exported.contents)
            .map_err(|e| CliError::io(format!("Failed to write {}: {e}", path.display())))?;

        print_notice(&exported.notice);
        println!("  -> {}", path.display());
        Ok(())
    }
}

/// Replace the draft with a local content file
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Content JSON file
    file: PathBuf,

    /// Publish right after importing
    #[arg(long)]
    save: bool,
}

impl ImportArgs {
    /// Execute import command
    pub fn execute(&self) -> CliResult<()> {
        let text = fs::read_to_string(&self.file)
            .map_err(|e| CliError::io(format!("Failed to read {}: {e}", self.file.display())))?;

        let mut session = Session::open()?;
        session.ready()?;
        let notice = session.editor.import(&text)?;
        session.persist()?;
        print_notice(&notice);

        if self.save {
            let notice = session.editor.save()?;
            session.discard_draft()?;
            print_notice(&notice);
        }
        Ok(())
    }
}
