//! Login, logout and status commands.

use std::io::{self, BufRead, Write};

use clap::Args;
use serde::Serialize;

use crate::cli::common::{output_json, print_notice, CliError, CliResult, Session};
use crate::editor::EditorState;

/// Unlock the editor
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Editor password (prompted on stdin when omitted)
    #[arg(long)]
    password: Option<String>,
}

impl LoginArgs {
    /// Execute login command
    pub fn execute(&self) -> CliResult<()> {
        let mut session = Session::open()?;

        let password = match &self.password {
            Some(p) => p.clone(),
            None => prompt_password()?,
        };

        let notice = session.editor.login(&password)?;
        print_notice(&notice);
        Ok(())
    }
}

fn prompt_password() -> CliResult<String> {
    eprint!("Password: ");
    io::stderr()
        .flush()
        .map_err(|e| CliError::io(format!("Failed to write prompt: {e}")))?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| CliError::io(format!("Failed to read password: {e}")))?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Lock the editor and discard the unsaved draft
#[derive(Args, Debug)]
pub struct LogoutArgs {}

impl LogoutArgs {
    /// Execute logout command
    pub fn execute(&self) -> CliResult<()> {
        let mut session = Session::open()?;
        let notice = session.editor.logout()?;
        session.discard_draft()?;
        print_notice(&notice);
        Ok(())
    }
}

/// Show login state, pending work and server health
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize, Debug)]
struct StatusOutput {
    authenticated: bool,
    state: &'static str,
    unsaved_draft: bool,
    pending_requests: usize,
    server_url: String,
    server: String,
}

impl StatusArgs {
    /// Execute status command
    pub fn execute(&self) -> CliResult<()> {
        let session = Session::open()?;

        let server = match session.client.health() {
            Ok(health) => format!("{} ({})", health.status, health.message),
            Err(e) => format!("unreachable: {e}"),
        };
        let output = StatusOutput {
            authenticated: session.editor.is_authenticated(),
            state: match session.editor.state() {
                EditorState::Unauthenticated => "unauthenticated",
                EditorState::Loading => "loading",
                EditorState::Ready => "ready",
            },
            unsaved_draft: session.has_stored_draft(),
            pending_requests: session.editor.requests().len(),
            server_url: session.config.editor.server_url.clone(),
            server,
        };

        if self.json {
            return output_json(&output);
        }

        println!("Logged in:        {}", if output.authenticated { "yes" } else { "no" });
        println!("Editor state:     {}", output.state);
        println!("Unsaved draft:    {}", if output.unsaved_draft { "yes" } else { "no" });
        println!("Pending requests: {}", output.pending_requests);
        println!("Server:           {} - {}", output.server_url, output.server);
        Ok(())
    }
}
