//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.bookboard.toml` files.

use crate::catalog::ClientConfig;
use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".bookboard.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Catalog API settings.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Table display settings.
    #[serde(default)]
    pub display: DisplayConfig,

    /// Export settings.
    #[serde(default)]
    pub export: ExportConfig,
}

/// Catalog API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Open Library base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Subject key to list.
    #[serde(default = "default_subject")]
    pub subject: String,

    /// Number of works to request.
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            subject: default_subject(),
            limit: default_limit(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    "https://openlibrary.org".to_string()
}

fn default_subject() -> String {
    "science_fiction".to_string()
}

fn default_limit() -> usize {
    50
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("bookboard/", env!("CARGO_PKG_VERSION")).to_string()
}

impl From<&CatalogConfig> for ClientConfig {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout_seconds: config.timeout_seconds,
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Table display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Rows per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Output format when none is given on the command line.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            format: OutputFormat::default(),
        }
    }
}

fn default_page_size() -> usize {
    crate::dashboard::state::DEFAULT_PAGE_SIZE
}

/// Export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// File name for CSV exports without an explicit --output.
    #[serde(default = "default_csv_filename")]
    pub csv_filename: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            csv_filename: default_csv_filename(),
        }
    }
}

fn default_csv_filename() -> String {
    "books.csv".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.bookboard.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only values given explicitly on the command line (or via env)
    /// override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref base_url) = args.base_url {
            self.catalog.base_url = base_url.clone();
        }
        if let Some(ref subject) = args.subject {
            self.catalog.subject = subject.clone();
        }
        if let Some(limit) = args.limit {
            self.catalog.limit = limit;
        }
        if let Some(timeout) = args.timeout {
            self.catalog.timeout_seconds = timeout;
        }
        if let Some(page_size) = args.page_size {
            self.display.page_size = page_size;
        }
        if let Some(format) = args.format {
            self.display.format = format;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
