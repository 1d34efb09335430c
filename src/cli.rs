//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::{Path, PathBuf};

/// provaudit - citation provenance tabulator for energy estimate reviews
///
/// Loads the sources table of a data center energy estimate review
/// (optionally with its estimates table), classifies every citation
/// record, and reports the percentage breakdowns quoted in the review:
/// peer-review share, vendor reliance, broken links, locatability.
///
/// Examples:
///   provaudit data/sources.csv
///   provaudit data/sources.csv --estimates data/estimates.csv
///   provaudit data/sources.csv --format json --output report.json
///   provaudit data/sources.csv --fail-on-broken 10
///   provaudit --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the sources table (CSV with header row)
    ///
    /// One row per source reference used by one analyzed publication.
    /// Not required when using --init-config.
    #[arg(value_name = "SOURCES", required_unless_present = "init_config")]
    pub sources: Option<PathBuf>,

    /// Path to the estimates table (CSV with header row)
    ///
    /// Adds estimate counts and per-year value distributions to the
    /// report. Can also be set via .provaudit.toml.
    #[arg(short, long, value_name = "FILE", env = "PROVAUDIT_ESTIMATES")]
    pub estimates: Option<PathBuf>,

    /// Output file path for the report
    ///
    /// If not specified, the report is printed to standard output.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .provaudit.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// CSV field delimiter (single ASCII character)
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Exclude estimates above this TWh value from distributions
    #[arg(long, value_name = "TWH")]
    pub exclude_above: Option<f64>,

    /// Fail if the broken-link rate reaches this whole percentage
    ///
    /// Useful for CI over a maintained dataset. Exit code 2 when the
    /// threshold is met or exceeded.
    #[arg(long, value_name = "PCT")]
    pub fail_on_broken: Option<u32>,

    /// Dry run: load and validate the datasets without reporting
    ///
    /// Prints record, publication, and estimate counts and exits.
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .provaudit.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
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

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(delimiter) = self.delimiter {
            if !delimiter.is_ascii() {
                return Err("Delimiter must be a single ASCII character".to_string());
            }
        }

        if let Some(ceiling) = self.exclude_above {
            if !(ceiling > 0.0) {
                return Err("--exclude-above must be positive".to_string());
            }
        }

        if let Some(threshold) = self.fail_on_broken {
            if threshold > 100 {
                return Err("--fail-on-broken must be between 0 and 100".to_string());
            }
        }

        let sources = self.sources.as_deref().unwrap_or(Path::new(""));
        if !sources.is_file() {
            return Err(format!("Sources file does not exist: {}", sources.display()));
        }

        if let Some(ref estimates) = self.estimates {
            if !estimates.is_file() {
                return Err(format!(
                    "Estimates file does not exist: {}",
                    estimates.display()
                ));
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
