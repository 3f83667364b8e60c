//! Sitescout main entry point
//!
//! Command-line interface for the Sitescout crawl pipeline.

use anyhow::Context;
use clap::Parser;
use sitescout::config::{load_config, validate};
use sitescout::output::{print_summary, summarize, write_results};
use sitescout::pipeline::Orchestrator;
use sitescout::Config;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use tracing_subscriber::EnvFilter;

/// Sitescout: polite site crawler for social accounts and pricing pages
///
/// Sitescout visits each seed site once, politely, and reports the social
/// media accounts it links to and (optionally) the pages where the site
/// publishes its prices.
#[derive(Parser, Debug)]
#[command(name = "sitescout")]
#[command(version = "1.0.0")]
#[command(about = "Find social accounts and pricing pages for a list of sites", long_about = None)]
struct Cli {
    /// File with one seed URL per line
    #[arg(value_name = "SEEDS")]
    seeds: PathBuf,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Output JSON file
    #[arg(short, long, default_value = "results.json")]
    output: PathBuf,

    /// Also discover pricing pages per site
    #[arg(long)]
    pricing: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration; absent file means stock defaults
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config(path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => {
            let config = Config::default();
            validate(&config)?;
            config
        }
    };

    let seeds = read_seeds(&cli.seeds)
        .with_context(|| format!("failed to read seed file {}", cli.seeds.display()))?;
    if seeds.is_empty() {
        tracing::warn!("No seed URLs found in {}", cli.seeds.display());
        return Ok(());
    }
    tracing::info!("Loaded {} seed sites", seeds.len());

    let orchestrator = Orchestrator::new(config, cli.pricing)?;

    // Ctrl-C finishes the current site, then stops the run cleanly
    let cancel = orchestrator.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing current site");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let results = orchestrator.run(&seeds).await;

    write_results(&results, &cli.output)?;
    if !cli.quiet {
        print_summary(&summarize(&results));
        println!("  Output written to: {}", cli.output.display());
    }

    Ok(())
}

/// Reads seed URLs from a file: one per line, blank lines skipped,
/// duplicates removed with first-occurrence order preserved
fn read_seeds(path: &Path) -> Result<Vec<String>, std::io::Error> {
    let raw = std::fs::read_to_string(path)?;

    let mut seeds = Vec::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if !seeds.iter().any(|existing| existing == line) {
            seeds.push(line.to_string());
        }
    }

    Ok(seeds)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitescout=info,warn"),
            1 => EnvFilter::new("sitescout=debug,info"),
            2 => EnvFilter::new("sitescout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
