//! provaudit - Citation Provenance Tabulator
//!
//! A CLI tool that loads the sources table of a data center energy
//! estimate review, classifies every citation record, and reports the
//! percentage breakdowns quoted in the review.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (data format, classification, config, IO)
//!   2 - Broken-link rate at or above --fail-on-broken

mod analysis;
mod classify;
mod cli;
mod config;
mod error;
mod loader;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use classify::Classifier;
use cli::{Args, OutputFormat};
use config::Config;
use loader::{DatasetLoader, LoadOptions};
use models::{EnergyEstimate, LinkStatus, Publication, Report, ReportMetadata};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
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

    // Initialize logging
    init_logging(&args);

    info!("provaudit v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_report(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Tabulation failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .provaudit.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".provaudit.toml");

    if path.exists() {
        eprintln!("⚠️  .provaudit.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .provaudit.toml")?;

    println!("✅ Created .provaudit.toml with default settings.");
    println!("   Edit it to customize vendor aliases, located codes, and report options.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete tabulation workflow. Returns exit code (0 or 2).
fn run_report(args: Args) -> Result<i32> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let sources_path = args
        .sources
        .clone()
        .context("sources path is required")?;

    // Step 1: Load the datasets
    println!("📥 Loading sources: {}", sources_path.display());
    let loader = DatasetLoader::new(LoadOptions::from(&config.dataset));
    let rows = loader.load_sources(&sources_path)?;

    let estimates_path: Option<PathBuf> = config.dataset.estimates.as_ref().map(PathBuf::from);
    let estimates = match &estimates_path {
        Some(path) => {
            println!("📥 Loading estimates: {}", path.display());
            loader.load_estimates(path)?
        }
        None => Vec::new(),
    };

    // Step 2: Classify every record
    println!("🔎 Classifying {} records...", rows.len());
    let classifier = Classifier::from_config(&config.classify);
    let records = classifier.classify_all(&rows)?;
    let publications = classify::assemble_publications(&rows, records, &estimates)?;

    // Handle --dry-run: the datasets are loaded and valid
    if args.dry_run {
        return handle_dry_run(&publications, &estimates);
    }

    // Step 3: Aggregate
    let provenance = analysis::summarize(&publications);
    let estimate_summary = if estimates.is_empty() {
        None
    } else {
        Some(analysis::summarize_estimates(
            &estimates,
            &analysis::EstimateOptions::from(&config.estimates),
        ))
    };
    let flow = analysis::flow_edges(&rows, &classifier);

    let report = Report {
        metadata: ReportMetadata {
            sources_path: sources_path.display().to_string(),
            estimates_path: estimates_path.map(|p| p.display().to_string()),
            generated_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        },
        provenance,
        estimates: estimate_summary,
        flow,
    };

    // Step 4: Render and deliver the report
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report, &config.report),
    };

    match &config.general.output {
        Some(path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path))?;

            println!("\n📊 Tabulation Summary:");
            println!("   Publications: {}", report.provenance.publications);
            println!("   Citation records: {}", report.provenance.records);
            if let Some(ref est) = report.estimates {
                println!("   Energy estimates: {}", est.total);
            }
            println!("\n✅ Report saved to: {}", path);
        }
        None => {
            println!();
            print!("{}", output);
        }
    }

    // Check --fail-on-broken threshold
    if let Some(threshold) = args.fail_on_broken {
        let broken = report
            .provenance
            .by_link_status
            .get(LinkStatus::Broken.label())
            .map(|entry| entry.percent)
            .unwrap_or(0);

        if broken >= threshold {
            eprintln!(
                "\n⛔ Broken-link rate {}% is at or above {}%. Failing (exit code 2).",
                broken, threshold
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Handle --dry-run: datasets loaded and classified, print counts, exit.
fn handle_dry_run(publications: &[Publication], estimates: &[EnergyEstimate]) -> Result<i32> {
    let records: usize = publications.iter().map(|p| p.records.len()).sum();

    println!("\n🔍 Dry run: datasets are valid.\n");
    println!("   Publications: {}", publications.len());
    println!("   Citation records: {}", records);
    println!("   Energy estimates: {}", estimates.len());
    println!("\n✅ Dry run complete. No report was generated.");
    Ok(0)
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
            info!("Loaded default config from .provaudit.toml");
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
