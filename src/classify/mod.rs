//! Deterministic classification of raw source rows.
//!
//! Each row is assigned exactly one reference type and one link
//! status. Rows the rule set cannot place fail with a
//! [`AuditError::Classification`] carrying the row identifier;
//! records are never silently dropped or bucketed.

pub mod vendors;

pub use vendors::VendorTaxonomy;

use crate::config::ClassifyConfig;
use crate::error::{AuditError, Result};
use crate::loader::SourceRow;
use crate::models::{CitationRecord, EnergyEstimate, LinkStatus, Publication, ReferenceType};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Classifier holding the vendor taxonomy and the located-code set.
pub struct Classifier {
    vendors: VendorTaxonomy,
    /// Reliability codes marking a source as located (uppercased).
    located_codes: HashSet<String>,
}

impl Classifier {
    pub fn new(vendors: VendorTaxonomy, located_codes: &[String]) -> Self {
        Self {
            vendors,
            located_codes: located_codes.iter().map(|c| c.to_uppercase()).collect(),
        }
    }

    pub fn from_config(config: &ClassifyConfig) -> Self {
        Self::new(
            VendorTaxonomy::with_aliases(&config.vendor_aliases),
            &config.located_codes,
        )
    }

    /// Whether a reliability code marks the source as located.
    pub fn located(&self, reliability: &str) -> bool {
        self.located_codes
            .contains(&reliability.trim().to_uppercase())
    }

    /// Classify one row into a [`CitationRecord`].
    pub fn classify(&self, row: &SourceRow) -> Result<CitationRecord> {
        let reference_type = self.reference_type(row)?;
        let link_status = self.link_status(row)?;

        let vendor = self
            .vendors
            .detect(&row.source_grouped)
            .or_else(|| self.vendors.detect(&row.source));

        // Vendor-data rows must name their vendor; fall back to the
        // grouped label when the taxonomy has no entry for it.
        let vendor = match (reference_type, vendor) {
            (ReferenceType::VendorData, Some(v)) => Some(v),
            (ReferenceType::VendorData, None) => {
                let label = if !row.source_grouped.is_empty() {
                    row.source_grouped.clone()
                } else {
                    row.source.clone()
                };
                if label.is_empty() {
                    return Err(AuditError::classification(
                        &row.row_id,
                        "vendor data without a source name",
                    ));
                }
                Some(label)
            }
            (_, v) => v,
        };

        Ok(CitationRecord {
            publication: row.publication.clone(),
            reference: row.reference.clone(),
            reference_type,
            vendor,
            link_status,
            year: row.year,
        })
    }

    /// Classify every row, stopping at the first failure.
    pub fn classify_all(&self, rows: &[SourceRow]) -> Result<Vec<CitationRecord>> {
        let records = rows
            .iter()
            .map(|row| self.classify(row))
            .collect::<Result<Vec<_>>>()?;
        debug!("classified {} records", records.len());
        Ok(records)
    }

    /// Rule order: explicit cell, then DOI, then vendor match.
    fn reference_type(&self, row: &SourceRow) -> Result<ReferenceType> {
        if !row.reference_type.is_empty() {
            return ReferenceType::parse(&row.reference_type).ok_or_else(|| {
                AuditError::data_format(
                    &row.row_id,
                    format!("unknown Reference Type '{}'", row.reference_type),
                )
            });
        }

        if !row.doi.is_empty() {
            return Ok(ReferenceType::PeerReviewed);
        }

        if self.vendors.detect(&row.source_grouped).is_some()
            || self.vendors.detect(&row.source).is_some()
        {
            return Ok(ReferenceType::VendorData);
        }

        Err(AuditError::classification(
            &row.row_id,
            "no rule assigns a reference type",
        ))
    }

    /// Rule order: explicit cell, then reliability code.
    fn link_status(&self, row: &SourceRow) -> Result<LinkStatus> {
        if !row.link_status.is_empty() {
            return LinkStatus::parse(&row.link_status).ok_or_else(|| {
                AuditError::data_format(
                    &row.row_id,
                    format!("unknown Link Status '{}'", row.link_status),
                )
            });
        }

        if self.located(&row.reliability) {
            Ok(LinkStatus::Valid)
        } else {
            Ok(LinkStatus::Unlocatable)
        }
    }
}

/// Group classified records into publications.
///
/// `rows` and `records` run in parallel, one entry per dataset row.
/// The estimate count per publication comes from the estimates table.
pub fn assemble_publications(
    rows: &[SourceRow],
    records: Vec<CitationRecord>,
    estimates: &[EnergyEstimate],
) -> Result<Vec<Publication>> {
    let mut estimate_counts: HashMap<&str, usize> = HashMap::new();
    for estimate in estimates {
        *estimate_counts.entry(estimate.publication.as_str()).or_default() += 1;
    }

    let mut publications: Vec<Publication> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (row, record) in rows.iter().zip(records) {
        match index.get(&record.publication) {
            Some(&i) => {
                let publication = &mut publications[i];
                if publication.year != record.year {
                    return Err(AuditError::data_format(
                        &row.row_id,
                        format!(
                            "publication '{}' has conflicting years {} and {}",
                            record.publication, publication.year, record.year
                        ),
                    ));
                }
                publication.scholar_citations =
                    publication.scholar_citations.max(row.citation_count);
                publication.records.push(record);
            }
            None => {
                index.insert(record.publication.clone(), publications.len());
                publications.push(Publication {
                    id: record.publication.clone(),
                    year: record.year,
                    scholar_citations: row.citation_count,
                    estimate_count: estimate_counts
                        .get(record.publication.as_str())
                        .copied()
                        .unwrap_or(0),
                    records: vec![record],
                });
            }
        }
    }

    Ok(publications)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_row(row_id: &str) -> SourceRow {
        SourceRow {
            row_id: row_id.to_string(),
            publication: "Shehabi et al., 2016".to_string(),
            year: 2016,
            reference: "ref-1".to_string(),
            reference_type: String::new(),
            source: String::new(),
            source_grouped: String::new(),
            reliability: String::new(),
            citation_count: 620,
            doi: String::new(),
            link_status: String::new(),
        }
    }

    fn classifier() -> Classifier {
        Classifier::new(
            VendorTaxonomy::new(),
            &["EL".to_string(), "PD".to_string()],
        )
    }

    #[test]
    fn test_explicit_type_wins_over_doi() {
        let mut row = make_row("sources.csv:2");
        row.reference_type = "Report".to_string();
        row.doi = "10.1000/xyz".to_string();

        let record = classifier().classify(&row).unwrap();
        assert_eq!(record.reference_type, ReferenceType::Report);
    }

    #[test]
    fn test_doi_implies_peer_reviewed() {
        let mut row = make_row("sources.csv:2");
        row.doi = "10.1000/xyz".to_string();
        row.reliability = "EL".to_string();

        let record = classifier().classify(&row).unwrap();
        assert_eq!(record.reference_type, ReferenceType::PeerReviewed);
        assert_eq!(record.link_status, LinkStatus::Valid);
    }

    #[test]
    fn test_vendor_match_implies_vendor_data() {
        let mut row = make_row("sources.csv:3");
        row.source = "IDC Worldwide Quarterly Server Tracker".to_string();

        let record = classifier().classify(&row).unwrap();
        assert_eq!(record.reference_type, ReferenceType::VendorData);
        assert_eq!(record.vendor.as_deref(), Some("IDC"));
    }

    #[test]
    fn test_vendor_attribution_on_report_rows() {
        let mut row = make_row("sources.csv:4");
        row.reference_type = "Report".to_string();
        row.source = "Cisco VNI".to_string();
        row.reliability = "PD".to_string();

        let record = classifier().classify(&row).unwrap();
        assert_eq!(record.reference_type, ReferenceType::Report);
        assert_eq!(record.vendor.as_deref(), Some("Cisco"));
    }

    #[test]
    fn test_unclassifiable_row_fails() {
        let row = make_row("sources.csv:5");

        let err = classifier().classify(&row).unwrap_err();
        match err {
            AuditError::Classification { record, .. } => {
                assert_eq!(record, "sources.csv:5");
            }
            other => panic!("expected Classification, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_explicit_type_is_data_format_error() {
        let mut row = make_row("sources.csv:6");
        row.reference_type = "blog".to_string();

        let err = classifier().classify(&row).unwrap_err();
        assert!(matches!(err, AuditError::DataFormat { .. }));
    }

    #[test]
    fn test_link_status_from_reliability_code() {
        let mut row = make_row("sources.csv:7");
        row.doi = "10.1/abc".to_string();
        row.reliability = "NF".to_string();

        let record = classifier().classify(&row).unwrap();
        assert_eq!(record.link_status, LinkStatus::Unlocatable);
    }

    #[test]
    fn test_explicit_broken_link() {
        let mut row = make_row("sources.csv:8");
        row.doi = "10.1/abc".to_string();
        row.link_status = "broken".to_string();
        row.reliability = "EL".to_string();

        let record = classifier().classify(&row).unwrap();
        assert_eq!(record.link_status, LinkStatus::Broken);
    }

    #[test]
    fn test_assemble_publications_groups_and_counts() {
        let c = classifier();

        let mut row_a1 = make_row("sources.csv:2");
        row_a1.doi = "10.1/a".to_string();
        let mut row_a2 = make_row("sources.csv:3");
        row_a2.reference = "ref-2".to_string();
        row_a2.doi = "10.1/b".to_string();
        let mut row_b = make_row("sources.csv:4");
        row_b.publication = "Koomey, 2011".to_string();
        row_b.year = 2011;
        row_b.citation_count = 900;
        row_b.doi = "10.1/c".to_string();

        let rows = vec![row_a1, row_a2, row_b];
        let records = c.classify_all(&rows).unwrap();

        let estimates = vec![EnergyEstimate {
            publication: "Shehabi et al., 2016".to_string(),
            geography: "USA".to_string(),
            method: crate::models::Method::BottomUp,
            estimate_year: 2020,
            value_twh: 73.0,
        }];

        let publications = assemble_publications(&rows, records, &estimates).unwrap();

        assert_eq!(publications.len(), 2);
        assert_eq!(publications[0].id, "Shehabi et al., 2016");
        assert_eq!(publications[0].records.len(), 2);
        assert_eq!(publications[0].estimate_count, 1);
        assert_eq!(publications[1].id, "Koomey, 2011");
        assert_eq!(publications[1].scholar_citations, 900);
        assert_eq!(publications[1].estimate_count, 0);

        let total: usize = publications.iter().map(|p| p.records.len()).sum();
        assert_eq!(total, rows.len());
    }

    #[test]
    fn test_assemble_rejects_conflicting_years() {
        let c = classifier();

        let mut row_a = make_row("sources.csv:2");
        row_a.doi = "10.1/a".to_string();
        let mut row_b = make_row("sources.csv:3");
        row_b.doi = "10.1/b".to_string();
        row_b.year = 2017;

        let rows = vec![row_a, row_b];
        let records = c.classify_all(&rows).unwrap();

        let err = assemble_publications(&rows, records, &[]).unwrap_err();
        assert!(err.to_string().contains("conflicting years"));
    }
}
