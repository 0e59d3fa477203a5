//! Bookboard - Open Library catalog dashboard
//!
//! A CLI that lists the works of an Open Library subject, enriches each one
//! with its rating and author details, and renders the merged catalog as a
//! paginated table or a CSV/JSON/Markdown export.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (catalog unavailable, bad config, invalid edit, etc.)

mod catalog;
mod cli;
mod config;
mod dashboard;
mod models;
mod report;

use anyhow::{bail, Context, Result};
use catalog::{CatalogAggregator, ClientConfig, OpenLibraryClient};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use dashboard::{Dashboard, LoadState, SortDirection};
use indicatif::{ProgressBar, ProgressStyle};
use models::Export;
use report::PageInfo;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("Bookboard v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args).await {
        error!("Dashboard failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .bookboard.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to change the subject, limit, page size and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so table and export output on stdout stays clean.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load the catalog, apply local operations and emit the requested output.
async fn run(args: Args) -> Result<()> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let limit = NonZeroUsize::new(config.catalog.limit).context("Limit must be at least 1")?;

    let client = OpenLibraryClient::new(ClientConfig::from(&config.catalog))
        .context("Failed to create Open Library client")?;
    let aggregator = CatalogAggregator::new(client, config.catalog.subject.clone());

    let mut dashboard = Dashboard::new();
    dashboard
        .set_page_size(config.display.page_size)
        .context("Invalid page size in configuration")?;

    // Load with a spinner while enrichment runs
    let spinner = loading_spinner(&args, aggregator.subject());
    dashboard.load(&aggregator, limit).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    if let LoadState::Failed(reason) = dashboard.state() {
        bail!("Could not load catalog: {}", reason);
    }

    info!(
        "Loaded {} books in {:.1}s",
        dashboard.records().len(),
        start_time.elapsed().as_secs_f64()
    );

    // Local edits, then filter and sort
    for edit in &args.edit {
        dashboard
            .edit(edit.row, edit.field, edit.value.clone())
            .with_context(|| format!("Cannot edit row {}", edit.row + 1))?;
    }

    if let Some(ref query) = args.search {
        dashboard.search(query);
    }

    if let Some(field) = args.sort {
        let direction = if args.desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        dashboard.sort_by(field, direction);
    }

    emit_output(&args, &config, &dashboard)
}

/// Render the current view in the configured format.
fn emit_output(args: &Args, config: &Config, dashboard: &Dashboard) -> Result<()> {
    match config.display.format {
        OutputFormat::Table => {
            let index = args.page - 1;
            let rows = dashboard.page(index)?;
            let page = PageInfo {
                index,
                count: dashboard.page_count(),
                total_rows: dashboard.view_len(),
                can_previous: dashboard.can_previous(index),
                can_next: dashboard.can_next(index),
            };
            write_or_print(args.output.as_ref(), &report::generate_table_page(&rows, &page))
        }
        OutputFormat::Csv => {
            let rows = dashboard.view();
            let path = args
                .output
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.export.csv_filename));
            report::write_output(&path, &report::generate_csv(&rows))?;
            if !args.quiet {
                println!("✅ Exported {} books to {}", rows.len(), path.display());
            }
            Ok(())
        }
        format @ (OutputFormat::Json | OutputFormat::Markdown) => {
            let export = Export::new(
                &config.catalog.subject,
                dashboard.view().into_iter().cloned().collect(),
                dashboard.filter().map(str::to_string),
            );
            let content = if format == OutputFormat::Json {
                report::generate_json_report(&export)?
            } else {
                report::generate_markdown_report(&export)
            };
            write_or_print(args.output.as_ref(), &content)
        }
    }
}

fn write_or_print(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            report::write_output(path, content)?;
            info!("Output written to {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

fn loading_spinner(args: &Args, subject: &str) -> Option<ProgressBar> {
    if args.quiet {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    match ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        Ok(style) => pb.set_style(style),
        Err(e) => warn!("Invalid spinner template: {}", e),
    }
    pb.set_message(format!("Loading '{}' catalog...", subject));
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
