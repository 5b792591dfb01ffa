//! Configuration management CLI commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::cli::common::{load_config, output_json, CliError, CliResult};
use crate::config::Config;

/// Configuration management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display current configuration
    Show(ConfigShowArgs),
    /// Set configuration values
    Set(ConfigSetArgs),
}

/// Display current configuration
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Set configuration values
#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    /// Persistence service base URL
    #[arg(long, value_name = "URL")]
    server_url: Option<String>,

    /// Site base URL (where content.json is served)
    #[arg(long, value_name = "URL")]
    site_url: Option<String>,

    /// Editor password
    #[arg(long)]
    password: Option<String>,

    /// Network timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// JPEG re-encode quality (0.0 - 1.0]
    #[arg(long)]
    quality: Option<f32>,

    /// Site checkout directory served by `raou-server`
    #[arg(long, value_name = "DIR")]
    site_root: Option<PathBuf>,

    /// Port `raou-server` listens on
    #[arg(long)]
    port: Option<u16>,
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(),
            ConfigCommand::Set(args) => args.execute(),
        }
    }
}

/// Copy of the config that is safe to print.
fn redacted(config: &Config) -> Config {
    let mut shown = config.clone();
    shown.editor.password = "*".repeat(8);
    shown
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self) -> CliResult<()> {
        let config = redacted(&load_config()?);

        if self.json {
            return output_json(&config);
        }

        let path = Config::config_file_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "(unknown)".to_string());

        println!("Raou Studio Configuration");
        println!("=========================");
        println!("File: {path}");
        println!();

        println!("Editor:");
        println!("  Server URL: {}", config.editor.server_url);
        println!("  Site URL:   {}", config.editor.site_url);
        println!("  Timeout:    {}s", config.editor.timeout_secs);
        println!("  Quality:    {}", config.editor.jpeg_quality);
        println!();

        println!("Server:");
        println!(
            "  Listen:       {}:{}",
            config.server.host, config.server.port
        );
        println!("  Site root:    {}", config.server.site_root.display());
        println!("  Content file: {}", config.server.content_path().display());
        println!("  Assets dir:   {}", config.server.assets_path().display());
        println!("  Built site:   {}", config.server.dist_path().display());
        println!("  Origins:      {}", config.server.allowed_origins.join(", "));
        println!();

        Ok(())
    }
}

impl ConfigSetArgs {
    fn is_empty(&self) -> bool {
        self.server_url.is_none()
            && self.site_url.is_none()
            && self.password.is_none()
            && self.timeout.is_none()
            && self.quality.is_none()
            && self.site_root.is_none()
            && self.port.is_none()
    }

    /// Execute set command
    pub fn execute(&self) -> CliResult<()> {
        if self.is_empty() {
            return Err(CliError::validation(
                "At least one configuration option must be specified (see `config set --help`)",
            ));
        }

        let mut config = load_config()?;

        if let Some(url) = &self.server_url {
            config.editor.server_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = &self.site_url {
            config.editor.site_url = url.trim_end_matches('/').to_string();
        }
        if let Some(password) = &self.password {
            config.editor.password.clone_from(password);
        }
        if let Some(timeout) = self.timeout {
            config.editor.timeout_secs = timeout;
        }
        if let Some(quality) = self.quality {
            config.editor.jpeg_quality = quality;
        }
        if let Some(root) = &self.site_root {
            if !root.is_dir() {
                return Err(CliError::validation(format!(
                    "Site root does not exist: {}",
                    root.display()
                )));
            }
            config.server.site_root.clone_from(root);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }

        config
            .validate()
            .map_err(|e| CliError::validation(format!("Invalid configuration: {e}")))?;
        config
            .save()
            .map_err(|e| CliError::io(format!("Failed to save configuration: {e:#}")))?;

        println!("Configuration updated successfully.");
        Ok(())
    }
}
