//! cdm-metadata - CONTENTdm export join tool
//!
//! Reads a tab-separated export, an XML export, or both, and writes the
//! joined item and page records as JSON lines or a TSV table.

use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use cdm_common::config::TomlConfig;
use clap::{Parser, ValueEnum};
use tracing::info;

use cdm_metadata::inputs::{locate_inputs, LocalInputs};
use cdm_metadata::output::{write_jsonl, write_summary, write_tsv};
use cdm_metadata::MetadataJoinEngine;

/// Output format for the joined record stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One JSON object per record
    Jsonl,
    /// Tab-separated table with a header row
    Tsv,
}

/// Command-line arguments for cdm-metadata
#[derive(Parser, Debug)]
#[command(name = "cdm-metadata")]
#[command(about = "Join CONTENTdm tab-separated and XML metadata exports")]
#[command(version)]
struct Args {
    /// Export files (.tsv and/or .xml, at most one of each)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Config file (overrides CDM_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory searched for export files that do not exist as given
    #[arg(short, long, env = "CDM_SEARCH_ROOT")]
    search_root: Option<PathBuf>,

    /// Read the exports through temporary local copies
    #[arg(long)]
    local_copy: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "jsonl")]
    format: OutputFormat,

    /// Only emit these fields (comma separated)
    #[arg(long, value_delimiter = ',')]
    fields: Option<Vec<String>>,

    /// Print record counts and the field list instead of records
    #[arg(long)]
    summary: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::resolve(args.config.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .with_writer(io::stderr)
        .init();

    info!(
        "Starting cdm-metadata v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let search_root = args.search_root.or(config.search_root);
    let files = locate_inputs(&args.files, search_root.as_deref())
        .context("Failed to locate export files")?;

    // Stores read everything up front, so the copies can go once the engine exists
    let engine = if args.local_copy {
        let local = LocalInputs::new(&files).context("Failed to copy export files")?;
        for source in local.sources() {
            info!("Copied {}", source.display());
        }
        let paths = local.paths();
        MetadataJoinEngine::with_settings(&paths, config.join)
    } else {
        MetadataJoinEngine::with_settings(&files, config.join)
    }
    .context("Failed to join exports")?;

    info!(
        "Joined {} items into {} records",
        engine.records().len(),
        engine.len()
    );

    let stdout = io::stdout();
    let out = BufWriter::new(stdout.lock());
    if args.summary {
        write_summary(&engine, out)?;
        return Ok(());
    }

    let fields = args.fields.as_deref();
    let written = match args.format {
        OutputFormat::Jsonl => write_jsonl(&engine, fields, out),
        OutputFormat::Tsv => write_tsv(&engine, fields, out),
    }
    .context("Failed to write records")?;

    info!("Wrote {} records", written);
    Ok(())
}
