//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::constants::{
    CONFIG_DIR_ENV, CONFIG_DIR_NAME, DEFAULT_JPEG_QUALITY, MAX_UPLOAD_BYTES,
};

/// Persistence service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Site checkout that all other paths are relative to
    pub site_root: PathBuf,
    /// Canonical content document, relative to `site_root`
    pub content_file: PathBuf,
    /// Directory uploaded images are written to, relative to `site_root`
    pub assets_dir: PathBuf,
    /// Pre-built site served for every unmatched path, relative to `site_root`
    pub dist_dir: PathBuf,
    /// Origins allowed to call the API from a browser
    pub allowed_origins: Vec<String>,
    /// Upload size cap in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            site_root: PathBuf::from("."),
            content_file: PathBuf::from("public/content.json"),
            assets_dir: PathBuf::from("src/assets"),
            dist_dir: PathBuf::from("dist"),
            allowed_origins: vec!["http://localhost:8080".to_string()],
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Creates a config rooted at `site_root` with default relative layout.
    pub fn for_site(site_root: impl Into<PathBuf>) -> Self {
        Self {
            site_root: site_root.into(),
            ..Self::default()
        }
    }

    /// Absolute-or-cwd-relative path of the content document.
    pub fn content_path(&self) -> PathBuf {
        self.site_root.join(&self.content_file)
    }

    /// Directory uploads land in.
    pub fn assets_path(&self) -> PathBuf {
        self.site_root.join(&self.assets_dir)
    }

    /// Built site directory.
    pub fn dist_path(&self) -> PathBuf {
        self.site_root.join(&self.dist_dir)
    }

    /// Site-relative URL prefix of uploaded assets (e.g., "/src/assets").
    pub fn assets_url_prefix(&self) -> String {
        let parts: Vec<String> = self
            .assets_dir
            .components()
            .filter_map(|c| match c {
                std::path::Component::Normal(s) => Some(s.to_string_lossy().to_string()),
                _ => None,
            })
            .collect();
        format!("/{}", parts.join("/"))
    }

    /// Socket address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .context(format!("Invalid listen address {}:{}", self.host, self.port))
    }
}

/// Authoring tool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Base URL of the persistence service
    pub server_url: String,
    /// Base URL the site (and `content.json`) is served from
    pub site_url: String,
    /// Shared editor password
    pub password: String,
    /// Timeout for every network call, in seconds
    pub timeout_secs: u64,
    /// Lossy re-encode quality (0.0 - 1.0)
    pub jpeg_quality: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:3001".to_string(),
            site_url: "http://localhost:3001".to_string(),
            password: "raou2024".to_string(),
            timeout_secs: 30,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/RaouStudio/config.toml`
/// - macOS: `~/Library/Application Support/RaouStudio/config.toml`
/// - Windows: `%APPDATA%\RaouStudio\config.toml`
///
/// `RAOU_CONFIG_DIR` overrides the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Persistence service settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Authoring tool settings
    #[serde(default)]
    pub editor: EditorConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(CONFIG_DIR_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads configuration from an explicit path.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(config_path).context(format!(
            "Failed to read config file: {}",
            config_path.display()
        ))?;

        let config: Self = toml::from_str(&content).context(format!(
            "Failed to parse config file: {}",
            config_path.display()
        ))?;

        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the config file using atomic write.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration to an explicit path (temp file + rename).
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(config_dir) = config_path.parent() {
            fs::create_dir_all(config_dir).context(format!(
                "Failed to create config directory: {}",
                config_dir.display()
            ))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        let temp_path = config_path.with_extension("toml.tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        fs::rename(&temp_path, config_path).context(format!(
            "Failed to rename temp config file to: {}",
            config_path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    ///
    /// Checks:
    /// - port is non-zero
    /// - content file and assets dir are relative to the site root
    /// - password is non-empty, timeout non-zero
    /// - quality is in (0, 1]
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be non-zero");
        }

        if self.server.content_file.is_absolute() {
            anyhow::bail!(
                "content_file must be relative to site_root: {}",
                self.server.content_file.display()
            );
        }

        if self.server.assets_dir.is_absolute() {
            anyhow::bail!(
                "assets_dir must be relative to site_root: {}",
                self.server.assets_dir.display()
            );
        }

        if self.server.max_upload_bytes == 0 {
            anyhow::bail!("max_upload_bytes must be non-zero");
        }

        if self.editor.password.is_empty() {
            anyhow::bail!("Editor password cannot be empty");
        }

        if self.editor.timeout_secs == 0 {
            anyhow::bail!("Network timeout must be at least one second");
        }

        if !(self.editor.jpeg_quality > 0.0 && self.editor.jpeg_quality <= 1.0) {
            anyhow::bail!(
                "jpeg_quality must be in (0, 1], got {}",
                self.editor.jpeg_quality
            );
        }

        Ok(())
    }
}
