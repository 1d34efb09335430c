//! Dataset loading for the sources and estimates tables.
//!
//! This module reads the CSV tables exported from the review
//! supplementary material and validates every row before anything
//! downstream runs. A malformed row aborts the load with a
//! [`AuditError::DataFormat`] naming the offending row.

use crate::error::{AuditError, Result};
use crate::models::{EnergyEstimate, Method};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Options controlling CSV ingestion.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Field delimiter, a single ASCII byte.
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl From<&crate::config::DatasetConfig> for LoadOptions {
    fn from(config: &crate::config::DatasetConfig) -> Self {
        Self {
            delimiter: config.delimiter_byte(),
        }
    }
}

/// A validated row of the sources table.
///
/// Category cells are kept raw; the classifier owns the closed-set
/// rules that turn them into a [`crate::models::CitationRecord`].
#[derive(Debug, Clone)]
pub struct SourceRow {
    /// Row identifier for error reporting, `file:line`.
    pub row_id: String,
    /// Publication citing this source (author-year label).
    pub publication: String,
    /// Year of the citing publication.
    pub year: u16,
    /// Reference identifier within the publication.
    pub reference: String,
    /// Raw reference-type cell, possibly blank.
    pub reference_type: String,
    /// Raw source name.
    pub source: String,
    /// Source label grouped for visualisations.
    pub source_grouped: String,
    /// Source-reliability code (e.g. EL, PD), possibly blank.
    pub reliability: String,
    /// Google Scholar citation count of the citing publication.
    pub citation_count: u32,
    /// DOI of the cited source, possibly blank.
    pub doi: String,
    /// Raw link-status cell, possibly blank.
    pub link_status: String,
}

#[derive(Debug, Deserialize)]
struct RawSourceRow {
    #[serde(rename = "Authors")]
    authors: String,
    #[serde(rename = "Publication Year")]
    publication_year: String,
    #[serde(rename = "Reference")]
    reference: String,
    #[serde(rename = "Reference Type", default)]
    reference_type: String,
    #[serde(rename = "Source", default)]
    source: String,
    #[serde(rename = "Source (Grouped for Visualisations)", default)]
    source_grouped: String,
    #[serde(rename = "Source Reliability", default)]
    reliability: String,
    #[serde(rename = "Citation Count", default)]
    citation_count: String,
    #[serde(rename = "DOI", default)]
    doi: String,
    #[serde(rename = "Link Status", default)]
    link_status: String,
}

#[derive(Debug, Deserialize)]
struct RawEstimateRow {
    #[serde(rename = "Authors")]
    authors: String,
    #[serde(rename = "Geography")]
    geography: String,
    #[serde(rename = "Method")]
    method: String,
    #[serde(rename = "Estimate year")]
    estimate_year: String,
    #[serde(rename = "Value (TWh)")]
    value_twh: String,
}

/// Loader for the review datasets.
pub struct DatasetLoader {
    options: LoadOptions,
}

impl DatasetLoader {
    pub fn new(options: LoadOptions) -> Self {
        Self { options }
    }

    /// Load and validate the sources table.
    ///
    /// Fails with [`AuditError::DataFormat`] on the first malformed row,
    /// and on an empty table: zero records would turn every downstream
    /// percentage into 0/0.
    pub fn load_sources(&self, path: &Path) -> Result<Vec<SourceRow>> {
        let mut reader = self.reader(path)?;
        let file = file_label(path);
        let mut rows = Vec::new();

        for (index, result) in reader.deserialize::<RawSourceRow>().enumerate() {
            // Header is line 1, first data row is line 2.
            let row_id = format!("{}:{}", file, index + 2);
            let raw = result.map_err(|e| AuditError::data_format(&row_id, e.to_string()))?;
            rows.push(validate_source_row(row_id, raw)?);
        }

        if rows.is_empty() {
            return Err(AuditError::data_format(file, "dataset contains no rows"));
        }

        debug!("loaded {} source rows from {}", rows.len(), path.display());
        Ok(rows)
    }

    /// Load and validate the estimates table.
    pub fn load_estimates(&self, path: &Path) -> Result<Vec<EnergyEstimate>> {
        let mut reader = self.reader(path)?;
        let file = file_label(path);
        let mut estimates = Vec::new();

        for (index, result) in reader.deserialize::<RawEstimateRow>().enumerate() {
            let row_id = format!("{}:{}", file, index + 2);
            let raw = result.map_err(|e| AuditError::data_format(&row_id, e.to_string()))?;
            estimates.push(validate_estimate_row(&row_id, raw)?);
        }

        if estimates.is_empty() {
            return Err(AuditError::data_format(file, "dataset contains no rows"));
        }

        debug!(
            "loaded {} estimate rows from {}",
            estimates.len(),
            path.display()
        );
        Ok(estimates)
    }

    fn reader(&self, path: &Path) -> Result<csv::Reader<std::fs::File>> {
        let reader = ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .trim(Trim::All)
            .from_path(path)?;
        Ok(reader)
    }
}

/// Short file label for row identifiers.
fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn validate_source_row(row_id: String, raw: RawSourceRow) -> Result<SourceRow> {
    if raw.authors.is_empty() {
        return Err(AuditError::data_format(row_id, "missing Authors"));
    }
    if raw.reference.is_empty() {
        return Err(AuditError::data_format(row_id, "missing Reference"));
    }

    let year = parse_year(&row_id, "Publication Year", &raw.publication_year)?;

    let citation_count = if raw.citation_count.is_empty() {
        0
    } else {
        raw.citation_count.parse::<u32>().map_err(|_| {
            AuditError::data_format(
                &row_id,
                format!("invalid Citation Count '{}'", raw.citation_count),
            )
        })?
    };

    Ok(SourceRow {
        row_id,
        publication: raw.authors,
        year,
        reference: raw.reference,
        reference_type: raw.reference_type,
        source: raw.source,
        source_grouped: raw.source_grouped,
        reliability: raw.reliability,
        citation_count,
        doi: raw.doi,
        link_status: raw.link_status,
    })
}

fn validate_estimate_row(row_id: &str, raw: RawEstimateRow) -> Result<EnergyEstimate> {
    if raw.authors.is_empty() {
        return Err(AuditError::data_format(row_id, "missing Authors"));
    }
    if raw.geography.is_empty() {
        return Err(AuditError::data_format(row_id, "missing Geography"));
    }

    let method = Method::parse(&raw.method).ok_or_else(|| {
        AuditError::data_format(row_id, format!("unknown Method '{}'", raw.method))
    })?;

    let estimate_year = parse_year(row_id, "Estimate year", &raw.estimate_year)?;

    let value_twh = raw.value_twh.parse::<f64>().map_err(|_| {
        AuditError::data_format(row_id, format!("invalid Value (TWh) '{}'", raw.value_twh))
    })?;
    if !value_twh.is_finite() || value_twh < 0.0 {
        return Err(AuditError::data_format(
            row_id,
            format!("Value (TWh) out of range: {}", value_twh),
        ));
    }

    Ok(EnergyEstimate {
        publication: raw.authors,
        geography: raw.geography,
        method,
        estimate_year,
        value_twh,
    })
}

fn parse_year(row_id: &str, field: &str, value: &str) -> Result<u16> {
    value
        .parse::<u16>()
        .map_err(|_| AuditError::data_format(row_id, format!("invalid {} '{}'", field, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SOURCES_HEADER: &str = "Authors,Publication Year,Reference,Reference Type,Source,Source (Grouped for Visualisations),Source Reliability,Citation Count,DOI,Link Status";

    fn write_csv(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        for line in lines {
            writeln!(file, "{}", line).expect("write line");
        }
        file
    }

    #[test]
    fn test_load_sources_valid() {
        let file = write_csv(&[
            SOURCES_HEADER,
            "\"Shehabi et al., 2016\",2016,ref-1,Peer-reviewed,Koomey 2011,Koomey,EL,620,10.1000/xyz,valid",
            "\"Shehabi et al., 2016\",2016,ref-2,Vendor data,IDC tracker,IDC,PD,620,,",
        ]);

        let loader = DatasetLoader::new(LoadOptions::default());
        let rows = loader.load_sources(file.path()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].publication, "Shehabi et al., 2016");
        assert_eq!(rows[0].year, 2016);
        assert_eq!(rows[0].citation_count, 620);
        assert_eq!(rows[1].source_grouped, "IDC");
        assert!(rows[1].link_status.is_empty());
    }

    #[test]
    fn test_load_sources_missing_authors() {
        let file = write_csv(&[SOURCES_HEADER, ",2016,ref-1,Peer-reviewed,Koomey,Koomey,EL,1,,valid"]);

        let loader = DatasetLoader::new(LoadOptions::default());
        let err = loader.load_sources(file.path()).unwrap_err();

        match err {
            AuditError::DataFormat { record, reason } => {
                assert!(record.ends_with(":2"), "record was {}", record);
                assert_eq!(reason, "missing Authors");
            }
            other => panic!("expected DataFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_load_sources_invalid_year() {
        let file = write_csv(&[
            SOURCES_HEADER,
            "\"Koomey, 2008\",two-thousand-eight,ref-1,Report,EPA,EPA,EL,100,,valid",
        ]);

        let loader = DatasetLoader::new(LoadOptions::default());
        let err = loader.load_sources(file.path()).unwrap_err();
        assert!(err.to_string().contains("invalid Publication Year"));
    }

    #[test]
    fn test_load_sources_empty_dataset() {
        let file = write_csv(&[SOURCES_HEADER]);

        let loader = DatasetLoader::new(LoadOptions::default());
        let err = loader.load_sources(file.path()).unwrap_err();
        assert!(err.to_string().contains("dataset contains no rows"));
    }

    #[test]
    fn test_load_estimates_valid() {
        let file = write_csv(&[
            "Authors,Geography,Method,Estimate year,Value (TWh)",
            "\"Andrae & Edler, 2015\",Global,Extrapolation,2030,8253",
            "\"Shehabi et al., 2016\",USA,Bottom-up,2020,73.0",
        ]);

        let loader = DatasetLoader::new(LoadOptions::default());
        let estimates = loader.load_estimates(file.path()).unwrap();

        assert_eq!(estimates.len(), 2);
        assert_eq!(estimates[0].method, Method::Extrapolation);
        assert_eq!(estimates[0].estimate_year, 2030);
        assert_eq!(estimates[1].value_twh, 73.0);
    }

    #[test]
    fn test_load_estimates_unknown_method() {
        let file = write_csv(&[
            "Authors,Geography,Method,Estimate year,Value (TWh)",
            "\"Andrae & Edler, 2015\",Global,Vibes,2030,8253",
        ]);

        let loader = DatasetLoader::new(LoadOptions::default());
        let err = loader.load_estimates(file.path()).unwrap_err();
        assert!(err.to_string().contains("unknown Method 'Vibes'"));
    }

    #[test]
    fn test_semicolon_delimiter() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "Authors;Geography;Method;Estimate year;Value (TWh)").unwrap();
        writeln!(file, "Shift Project, 2019;Global;Top-down;2020;1300").unwrap();

        let loader = DatasetLoader::new(LoadOptions { delimiter: b';' });
        let estimates = loader.load_estimates(file.path()).unwrap();
        assert_eq!(estimates[0].publication, "Shift Project, 2019");
    }
}
