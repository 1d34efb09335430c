//! Citation-flow edges between publications and their grouped sources.
//!
//! The review visualizes citation provenance as a sankey diagram:
//! one link per distinct (publication, grouped source) pair, colored
//! by whether the source could be located and by the citing
//! publication's citation-count band. This module produces that edge
//! list; rendering is left to downstream tooling.

use crate::classify::Classifier;
use crate::loader::SourceRow;
use crate::models::{CitationBand, FlowEdge};
use std::collections::HashSet;

/// Vendor whose sources are always marked not-found: IDC data is
/// non-public, so the citation can never be followed to the source.
const ALWAYS_UNFOUND: &str = "IDC";

/// Build the deduplicated edge list in dataset order.
pub fn flow_edges(rows: &[SourceRow], classifier: &Classifier) -> Vec<FlowEdge> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut edges = Vec::new();

    for row in rows {
        let source = source_label(row);
        let key = (row.publication.clone(), source.clone());
        if !seen.insert(key) {
            continue;
        }

        let found = classifier.located(&row.reliability)
            && !source.eq_ignore_ascii_case(ALWAYS_UNFOUND);

        edges.push(FlowEdge {
            source,
            publication: row.publication.clone(),
            found,
            band: CitationBand::from_count(row.citation_count),
        });
    }

    edges
}

/// Grouped label with fallbacks for sparse rows.
fn source_label(row: &SourceRow) -> String {
    if !row.source_grouped.is_empty() {
        row.source_grouped.clone()
    } else if !row.source.is_empty() {
        row.source.clone()
    } else {
        row.reference.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::VendorTaxonomy;

    fn make_row(publication: &str, grouped: &str, reliability: &str, citations: u32) -> SourceRow {
        SourceRow {
            row_id: "sources.csv:2".to_string(),
            publication: publication.to_string(),
            year: 2019,
            reference: "ref-1".to_string(),
            reference_type: "Report".to_string(),
            source: String::new(),
            source_grouped: grouped.to_string(),
            reliability: reliability.to_string(),
            citation_count: citations,
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
    fn test_edges_deduplicate_per_publication_and_source() {
        let rows = vec![
            make_row("Shift Project, 2019", "Gartner", "NF", 150),
            make_row("Shift Project, 2019", "Gartner", "NF", 150),
            make_row("Shift Project, 2019", "Statista", "NF", 150),
            make_row("Andrae & Edler, 2015", "Gartner", "EL", 1200),
        ];

        let edges = flow_edges(&rows, &classifier());
        assert_eq!(edges.len(), 3);
        assert_eq!(edges[0].source, "Gartner");
        assert_eq!(edges[1].source, "Statista");
        assert_eq!(edges[2].publication, "Andrae & Edler, 2015");
    }

    #[test]
    fn test_located_code_marks_found() {
        let rows = vec![
            make_row("A, 2016", "Koomey", "EL", 50),
            make_row("A, 2016", "Masanet", "PD", 50),
            make_row("A, 2016", "Gartner", "NF", 50),
        ];

        let edges = flow_edges(&rows, &classifier());
        assert!(edges[0].found);
        assert!(edges[1].found);
        assert!(!edges[2].found);
    }

    #[test]
    fn test_idc_always_unfound() {
        let rows = vec![make_row("Shehabi et al., 2016", "IDC", "PD", 620)];

        let edges = flow_edges(&rows, &classifier());
        assert!(!edges[0].found);
    }

    #[test]
    fn test_band_from_citing_publication() {
        let rows = vec![
            make_row("A, 2016", "Koomey", "EL", 620),
            make_row("B, 2013", "Koomey", "EL", 1400),
            make_row("C, 2020", "Koomey", "EL", 12),
        ];

        let edges = flow_edges(&rows, &classifier());
        assert_eq!(edges[0].band, CitationBand::Gte500);
        assert_eq!(edges[1].band, CitationBand::Gte1000);
        assert_eq!(edges[2].band, CitationBand::Under100);
    }

    #[test]
    fn test_source_label_fallbacks() {
        let mut row = make_row("A, 2016", "", "EL", 10);
        row.source = "EPA 2007".to_string();
        assert_eq!(source_label(&row), "EPA 2007");

        row.source = String::new();
        assert_eq!(source_label(&row), "ref-1");
    }
}
