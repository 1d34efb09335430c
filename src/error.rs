//! Error types for the provenance tabulator.
//!
//! A dataset containing any invalid record aborts the whole run: a
//! partially classified corpus would bias the reported percentages.

use thiserror::Error;

/// Errors surfaced by the load -> classify -> aggregate pipeline.
#[derive(Error, Debug)]
pub enum AuditError {
    /// A dataset row is malformed: missing required fields, an
    /// unparseable number, or a value outside its closed set.
    #[error("data format error at {record}: {reason}")]
    DataFormat { record: String, reason: String },

    /// A record could not be assigned a category under the fixed rule
    /// set. Carries the record identifier for the audit trail.
    #[error("classification error for {record}: {reason}")]
    Classification { record: String, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AuditError>;

impl AuditError {
    /// Build a [`AuditError::DataFormat`] for the given record identifier.
    pub fn data_format(record: impl Into<String>, reason: impl Into<String>) -> Self {
        AuditError::DataFormat {
            record: record.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`AuditError::Classification`] for the given record identifier.
    pub fn classification(record: impl Into<String>, reason: impl Into<String>) -> Self {
        AuditError::Classification {
            record: record.into(),
            reason: reason.into(),
        }
    }

    /// The identifier of the record that triggered this error, if any.
    #[allow(dead_code)] // Accessor for programmatic error consumers
    pub fn record(&self) -> Option<&str> {
        match self {
            AuditError::DataFormat { record, .. } => Some(record),
            AuditError::Classification { record, .. } => Some(record),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_record() {
        let err = AuditError::data_format("sources.csv:12", "missing Authors");
        assert_eq!(
            err.to_string(),
            "data format error at sources.csv:12: missing Authors"
        );
        assert_eq!(err.record(), Some("sources.csv:12"));
    }

    #[test]
    fn test_classification_error_record() {
        let err = AuditError::classification("Koomey, 2008 -> ref 14", "no applicable rule");
        assert_eq!(err.record(), Some("Koomey, 2008 -> ref 14"));
    }
}
