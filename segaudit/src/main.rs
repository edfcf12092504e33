//! segaudit - Segment consistency audit for multi-part story feeds
//!
//! Loads a JSON-lines batch (plain or `.zip`), checks every story for missing,
//! duplicated and out-of-range segments, validates entity ids, and appends a
//! report to `<log directory>/<input file name>_logs.txt`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use segaudit::{report, JsonLinesSource, ReportWriter};
use segaudit_common::config::{self, TomlConfig, LOG_DIR_ENV_VAR};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for segaudit
#[derive(Parser, Debug)]
#[command(name = "segaudit")]
#[command(about = "Audit multi-part story records for structural consistency")]
#[command(version)]
struct Args {
    /// JSON-lines input file, or a .zip archive containing one
    input: PathBuf,

    /// Directory receiving the report file
    log_directory: Option<PathBuf>,

    /// Config file (default: platform config location)
    #[arg(short, long, env = "SEGAUDIT_CONFIG")]
    config: Option<PathBuf>,

    /// Also print the analysis result as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing starts so its level can seed the filter
    let loaded_config = config::try_load(args.config.as_deref());
    let toml_config = match &loaded_config {
        Ok(Some((_, config))) => config.clone(),
        _ => TomlConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&toml_config.logging.level)),
        )
        .init();

    info!(
        "Starting segaudit v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("SEGAUDIT_GIT_HASH"),
        env!("SEGAUDIT_BUILD_TIMESTAMP"),
        env!("SEGAUDIT_BUILD_PROFILE")
    );

    match loaded_config {
        Ok(Some((path, _))) => info!("Config: {}", path.display()),
        Ok(None) => debug!("No config file, using defaults"),
        Err(e) => warn!("{} (using defaults)", e),
    }

    let log_directory =
        config::resolve_log_directory(args.log_directory.as_deref(), LOG_DIR_ENV_VAR, &toml_config);
    let fields = &toml_config.fields;

    let audit = segaudit::audit(&JsonLinesSource::new(), &args.input, fields)
        .with_context(|| format!("Failed to load records from {}", args.input.display()))?;

    if !audit.loaded.skipped.is_empty() {
        warn!(
            skipped = audit.loaded.skipped.len(),
            "Some input lines were not records"
        );
    }

    let label = segaudit::source_label(&args.input);
    let text = report::compose(&audit.result, &audit.findings, &label, fields);

    let writer = ReportWriter::new(log_directory);
    let path = writer
        .write(&label, &text)
        .with_context(|| format!("Failed to write report to {}", writer.log_directory().display()))?;
    info!("Report appended to {}", path.display());

    if args.json {
        let json = report::to_json(&audit.result).context("Failed to serialize analysis result")?;
        println!("{json}");
    }

    Ok(())
}
