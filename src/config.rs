//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.provaudit.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Dataset ingestion settings.
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Classification settings.
    #[serde(default)]
    pub classify: ClassifyConfig,

    /// Estimate aggregation settings.
    #[serde(default)]
    pub estimates: EstimatesConfig,

    /// Report generation settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default report output path. None prints to stdout.
    #[serde(default)]
    pub output: Option<String>,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Dataset ingestion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// CSV field delimiter (single ASCII character).
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Default estimates table path, overridable via --estimates.
    #[serde(default)]
    pub estimates: Option<String>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            estimates: None,
        }
    }
}

fn default_delimiter() -> String {
    ",".to_string()
}

impl DatasetConfig {
    /// The delimiter as a byte. Falls back to a comma when the
    /// configured value is not a single ASCII character; `validate`
    /// rejects such configs before this is reached.
    pub fn delimiter_byte(&self) -> u8 {
        match self.delimiter.as_bytes() {
            [b] => *b,
            _ => b',',
        }
    }
}

/// Classification rule settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyConfig {
    /// Reliability codes that mark a source as located.
    #[serde(default = "default_located_codes")]
    pub located_codes: Vec<String>,

    /// Extra vendor aliases: canonical label -> alias list. Extends
    /// the built-in taxonomy (IDC, Cisco, Gartner, Statista).
    #[serde(default)]
    pub vendor_aliases: HashMap<String, Vec<String>>,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            located_codes: default_located_codes(),
            vendor_aliases: HashMap::new(),
        }
    }
}

fn default_located_codes() -> Vec<String> {
    vec!["EL".to_string(), "PD".to_string()]
}

/// Estimate aggregation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatesConfig {
    /// Geography labels counted as Europe.
    #[serde(default = "default_europe")]
    pub europe: Vec<String>,

    /// Exclude estimates above this TWh value from distributions.
    #[serde(default = "default_exclude_above")]
    pub exclude_above_twh: Option<f64>,
}

impl Default for EstimatesConfig {
    fn default() -> Self {
        Self {
            europe: default_europe(),
            exclude_above_twh: default_exclude_above(),
        }
    }
}

fn default_europe() -> Vec<String> {
    crate::analysis::estimates::default_europe()
}

fn default_exclude_above() -> Option<f64> {
    Some(2000.0)
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include the per-publication-year section.
    #[serde(default = "default_true")]
    pub include_year_buckets: bool,

    /// Include the citation-flow section.
    #[serde(default = "default_true")]
    pub include_flow: bool,

    /// Maximum not-found sources listed in the Markdown flow section.
    #[serde(default = "default_max_flow_rows")]
    pub max_flow_rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_year_buckets: true,
            include_flow: true,
            max_flow_rows: default_max_flow_rows(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_flow_rows() -> usize {
    20
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".provaudit.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Reject configs the pipeline cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.dataset.delimiter.as_bytes().len() != 1 {
            anyhow::bail!(
                "dataset.delimiter must be a single ASCII character, got '{}'",
                self.dataset.delimiter
            );
        }
        if self.classify.located_codes.is_empty() {
            anyhow::bail!("classify.located_codes must not be empty");
        }
        if let Some(ceiling) = self.estimates.exclude_above_twh {
            if !(ceiling > 0.0) {
                anyhow::bail!("estimates.exclude_above_twh must be positive");
            }
        }
        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = Some(output.display().to_string());
        }
        if let Some(ref estimates) = args.estimates {
            self.dataset.estimates = Some(estimates.display().to_string());
        }
        if let Some(delimiter) = args.delimiter {
            self.dataset.delimiter = delimiter.to_string();
        }
        if let Some(ceiling) = args.exclude_above {
            self.estimates.exclude_above_twh = Some(ceiling);
        }

        // Flags always override.
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
