//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::catalog::is_valid_subject;
use crate::models::Field;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Bookboard - Open Library catalog dashboard
///
/// Lists the works of an Open Library subject, enriched with ratings and
/// author details, as a sortable, searchable, paginated table. Results can
/// be edited locally and exported to CSV, JSON or Markdown.
///
/// Examples:
///   bookboard
///   bookboard --subject fantasy --limit 100 --page 2
///   bookboard --search asimov --sort first_publish_year --desc
///   bookboard --edit "3:title=Dune (1965)" --format csv -o books.csv
///   bookboard --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Subject key to list (e.g. science_fiction, fantasy, history)
    #[arg(short, long, value_name = "KEY", env = "BOOKBOARD_SUBJECT")]
    pub subject: Option<String>,

    /// Number of works to fetch
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub limit: Option<usize>,

    /// Open Library base URL
    #[arg(long, value_name = "URL", env = "OPENLIBRARY_URL")]
    pub base_url: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .bookboard.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Only show rows containing this text in any column (case-insensitive)
    #[arg(long, value_name = "QUERY")]
    pub search: Option<String>,

    /// Sort rows by a column (key or header, e.g. title, "Ratings Average")
    #[arg(long, value_name = "FIELD")]
    pub sort: Option<Field>,

    /// Sort in descending order
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Page to display (1-based)
    #[arg(long, default_value = "1", value_name = "N")]
    pub page: usize,

    /// Rows per page
    #[arg(long, value_name = "N")]
    pub page_size: Option<usize>,

    /// Edit a cell before display/export: ROW:FIELD=VALUE (row is 1-based)
    ///
    /// May be given multiple times. Edits are local and never sent back to
    /// Open Library.
    #[arg(long, value_name = "ROW:FIELD=VALUE")]
    pub edit: Vec<CellEdit>,

    /// Output format (table, csv, json, markdown)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Output file path
    ///
    /// Defaults to stdout, except CSV which defaults to the configured
    /// export file name (books.csv).
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Generate a default .bookboard.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the dashboard.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Paginated text table (default)
    #[default]
    Table,
    /// Comma-separated values
    Csv,
    /// JSON document
    Json,
    /// Markdown table
    Markdown,
}

/// A single `--edit` instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEdit {
    /// Zero-based row in the working copy.
    pub row: usize,
    pub field: Field,
    pub value: String,
}

impl FromStr for CellEdit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (target, value) = s
            .split_once('=')
            .ok_or_else(|| format!("Expected ROW:FIELD=VALUE, got '{}'", s))?;
        let (row, field) = target
            .split_once(':')
            .ok_or_else(|| format!("Expected ROW:FIELD=VALUE, got '{}'", s))?;

        let row: usize = row
            .trim()
            .parse()
            .map_err(|_| format!("Invalid row number: '{}'", row))?;
        if row == 0 {
            return Err("Row numbers start at 1".to_string());
        }

        Ok(Self {
            row: row - 1,
            field: field.parse()?,
            value: value.to_string(),
        })
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref url) = self.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Base URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(ref subject) = self.subject {
            if !is_valid_subject(subject) {
                return Err(format!("Invalid subject key: '{}'", subject));
            }
        }

        if self.limit == Some(0) {
            return Err("Limit must be at least 1".to_string());
        }

        if self.page == 0 {
            return Err("Pages start at 1".to_string());
        }

        if self.page_size == Some(0) {
            return Err("Page size must be at least 1".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
