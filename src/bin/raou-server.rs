//! Raou persistence service binary
//!
//! Serves the built site and accepts content saves and image uploads from
//! the editor.
//!
//! # Usage
//!
//! ```bash
//! # Start with settings from the config file (port 3001, current directory as site root)
//! raou-server
//!
//! # Serve a specific site checkout on another port
//! raou-server --site-root ~/raou-site --port 8080
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use raou_studio::config::Config;
use raou_studio::web;

/// Raou persistence service - uploads, content saves and the built site
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to (overrides the config file)
    #[arg(long)]
    host: Option<String>,

    /// Site checkout containing public/, src/assets/ and dist/
    #[arg(short, long)]
    site_root: Option<PathBuf>,

    /// Additional browser origin allowed to call the API
    #[arg(long = "allow-origin", value_name = "ORIGIN")]
    allow_origins: Vec<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load configuration")?;
    let mut server = config.server;

    if let Some(port) = args.port {
        server.port = port;
    }
    if let Some(host) = args.host {
        server.host = host;
    }
    if let Some(root) = args.site_root {
        server.site_root = root;
    }
    server.allowed_origins.extend(args.allow_origins);

    anyhow::ensure!(server.port != 0, "Port must be non-zero");
    anyhow::ensure!(
        server.site_root.is_dir(),
        "Site root does not exist: {}",
        server.site_root.display()
    );

    info!("Site root: {}", server.site_root.display());

    web::run_server(server).await
}
