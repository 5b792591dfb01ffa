//! Feature request commands.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::cli::common::{output_json, print_notice, CliError, CliResult, Session};
use crate::content::{Priority, RequestKind};
use crate::editor::NewRequest;

/// Manage feature requests (published with the next save)
#[derive(Args, Debug)]
pub struct RequestsArgs {
    #[command(subcommand)]
    command: RequestsCommand,
}

#[derive(Subcommand, Debug)]
enum RequestsCommand {
    /// List pending requests
    List(ListArgs),
    /// Add a request
    Add(AddArgs),
    /// Remove a request by id
    Remove(RemoveArgs),
    /// Write all requests to a JSON file
    Export(ExportArgs),
}

/// List pending requests
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Add a request
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Request type: new-page, content-edit, new-feature, bug-report or other
    #[arg(long = "type", value_name = "TYPE")]
    kind: String,

    /// Short title
    #[arg(long)]
    title: String,

    /// Details
    #[arg(long)]
    description: String,

    /// Priority: low, medium or high
    #[arg(long, default_value = "medium")]
    priority: String,
}

/// Remove a request by id
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Request id (see `requests list`)
    id: String,
}

/// Write all requests to a JSON file
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output path (defaults to feature-requests-<date>.json)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

impl RequestsArgs {
    /// Execute requests subcommand
    pub fn execute(&self) -> CliResult<()> {
        let mut session = Session::open()?;
        session.ready()?;

        match &self.command {
            RequestsCommand::List(args) => args.execute(&session),
            RequestsCommand::Add(args) => args.execute(&mut session),
            RequestsCommand::Remove(args) => args.execute(&mut session),
            RequestsCommand::Export(args) => args.execute(&session),
        }
    }
}

impl ListArgs {
    fn execute(&self, session: &Session) -> CliResult<()> {
        let requests = session.editor.requests();
        if self.json {
            return output_json(requests.items());
        }

        if requests.is_empty() {
            println!("No feature requests yet.");
            return Ok(());
        }
        println!("Submitted Requests ({})", requests.len());
        for r in requests.items() {
            println!();
            println!("[{}] {} ({})", r.id, r.title, r.kind.display_name());
            println!("  Priority: {:?}  Date: {}", r.priority, r.date.format("%Y-%m-%d"));
            println!("  {}", r.description);
        }
        Ok(())
    }
}

impl AddArgs {
    fn execute(&self, session: &mut Session) -> CliResult<()> {
        let kind = RequestKind::parse(&self.kind).ok_or_else(|| {
            CliError::validation(format!(
                "Invalid request type '{}'. Expected new-page, content-edit, new-feature, bug-report or other",
                self.kind
            ))
        })?;
        let priority = Priority::parse(&self.priority).ok_or_else(|| {
            CliError::validation(format!(
                "Invalid priority '{}'. Expected low, medium or high",
                self.priority
            ))
        })?;

        let notice = session.editor.add_request(NewRequest {
            kind: Some(kind),
            title: self.title.clone(),
            description: self.description.clone(),
            priority,
        })?;
        session.persist()?;
        print_notice(&notice);
        Ok(())
    }
}

impl RemoveArgs {
    fn execute(&self, session: &mut Session) -> CliResult<()> {
        let notice = session.editor.remove_request(&self.id)?;
        session.persist()?;
        print_notice(&notice);
        Ok(())
    }
}

impl ExportArgs {
    fn execute(&self, session: &Session) -> CliResult<()> {
        let exported = session.editor.export_requests()?;
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
