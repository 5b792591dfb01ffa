//! Image upload and requirement listing.

use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::cli::common::{output_json, print_notice, CliError, CliResult, Session};
use crate::images::IMAGE_REQUIREMENTS;

/// Replace a site image
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Asset to replace (see `requirements`), e.g. "logo.png"
    asset: String,

    /// Source image file
    file: PathBuf,
}

impl UploadArgs {
    /// Execute upload command
    pub fn execute(&self) -> CliResult<()> {
        let data = fs::read(&self.file)
            .map_err(|e| CliError::io(format!("Failed to read {}: {e}", self.file.display())))?;
        let source_name = self
            .file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut session = Session::open()?;
        let (notice, response) = session
            .editor
            .upload_image(&self.asset, &source_name, &data)?;

        print_notice(&notice);
        println!("  -> {}", response.path);
        Ok(())
    }
}

/// List replaceable images and their limits
#[derive(Args, Debug)]
pub struct RequirementsArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(serde::Serialize, Debug)]
struct RequirementOutput<'a> {
    asset: &'a str,
    #[serde(flatten)]
    requirement: &'a crate::images::ImageRequirement,
}

impl RequirementsArgs {
    /// Execute requirements command
    pub fn execute(&self) -> CliResult<()> {
        if self.json {
            let rows: Vec<RequirementOutput<'_>> = IMAGE_REQUIREMENTS
                .iter()
                .map(|(asset, requirement)| RequirementOutput {
                    asset: *asset,
                    requirement,
                })
                .collect();
            return output_json(&rows);
        }

        println!(
            "{:<26} {:<20} {:>11} {:>8}  Formats",
            "Asset", "Name", "Size", "Max KB"
        );
        for (asset, req) in IMAGE_REQUIREMENTS {
            println!(
                "{:<26} {:<20} {:>11} {:>8}  {}",
                asset,
                req.name,
                format!("{}x{}", req.width, req.height),
                req.max_size_kb,
                req.formats.join(", ")
            );
        }
        Ok(())
    }
}
