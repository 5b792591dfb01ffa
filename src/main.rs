//! Raou Studio - command-line content editor for the Raou site
//!
//! Edits the site's content document and images through the persistence
//! service (`raou-server`).

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use raou_studio::cli::{
    CliResult, ConfigArgs, EditArgs, ExportArgs, ImportArgs, LoginArgs, LogoutArgs,
    RequestsArgs, RequirementsArgs, SaveArgs, SetArgs, ShowArgs, StatusArgs, UploadArgs,
};

/// Raou Studio - edit the Raou site's content and images
#[derive(Parser, Debug)]
#[command(name = "raou", author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Unlock the editor
    Login(LoginArgs),
    /// Lock the editor and discard the unsaved draft
    Logout(LogoutArgs),
    /// Show login state, pending work and server health
    Status(StatusArgs),
    /// Print the draft, or one field of it
    Show(ShowArgs),
    /// Set one field of the draft by path
    Set(SetArgs),
    /// Edit a named field of the draft
    Edit(EditArgs),
    /// Publish the draft to the site
    Save(SaveArgs),
    /// Write the draft to a local file
    Export(ExportArgs),
    /// Replace the draft with a local content file
    Import(ImportArgs),
    /// Replace a site image
    Upload(UploadArgs),
    /// List replaceable images and their limits
    Requirements(RequirementsArgs),
    /// Manage feature requests
    Requests(RequestsArgs),
    /// Manage configuration
    Config(ConfigArgs),
}

fn run(command: Command) -> CliResult<()> {
    match command {
        Command::Login(args) => args.execute(),
        Command::Logout(args) => args.execute(),
        Command::Status(args) => args.execute(),
        Command::Show(args) => args.execute(),
        Command::Set(args) => args.execute(),
        Command::Edit(args) => args.execute(),
        Command::Save(args) => args.execute(),
        Command::Export(args) => args.execute(),
        Command::Import(args) => args.execute(),
        Command::Upload(args) => args.execute(),
        Command::Requirements(args) => args.execute(),
        Command::Requests(args) => args.execute(),
        Command::Config(args) => args.execute(),
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}
