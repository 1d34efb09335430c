//! Markdown and JSON report generation.
//!
//! This module renders the aggregate report as the summary figures
//! quoted in the review abstract. Rendering is a pure function of the
//! report value.

use crate::config::ReportConfig;
use crate::models::{Breakdown, EstimateSummary, FlowEdge, Report, ReportMetadata};
use anyhow::Result;
use std::collections::HashMap;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, options: &ReportConfig) -> String {
    let mut output = String::new();

    output.push_str("# Provenance Report\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_corpus_section(report));

    output.push_str(&generate_breakdown_section(
        "Sources by Reference Type",
        "Category",
        &report.provenance.by_reference_type,
    ));
    output.push_str(&generate_vendor_section(&report.provenance.by_vendor));
    output.push_str(&generate_breakdown_section(
        "Sources by Link Status",
        "Status",
        &report.provenance.by_link_status,
    ));

    if options.include_year_buckets {
        output.push_str(&generate_year_section(report));
    }

    if let Some(ref estimates) = report.estimates {
        output.push_str(&generate_estimates_section(estimates));
    }

    if options.include_flow {
        output.push_str(&generate_flow_section(&report.flow, options.max_flow_rows));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Sources:** `{}`\n", metadata.sources_path));
    if let Some(ref estimates) = metadata.estimates_path {
        section.push_str(&format!("- **Estimates:** `{}`\n", estimates));
    }
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **provaudit version:** {}\n", metadata.tool_version));
    section.push('\n');

    section
}

/// Generate the corpus section. Record and publication counts are
/// reported side by side because they are different denominators.
fn generate_corpus_section(report: &Report) -> String {
    let mut section = String::new();

    section.push_str("## Corpus\n\n");
    section.push_str(&format!(
        "- **Publications analyzed:** {}\n",
        report.provenance.publications
    ));
    section.push_str(&format!(
        "- **Citation records:** {}\n",
        report.provenance.records
    ));
    section.push('\n');

    section
}

/// Generate one percentage table over a closed dimension.
fn generate_breakdown_section(title: &str, column: &str, breakdown: &Breakdown) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", title));
    section.push_str(&format!("| {} | Records | Share |\n", column));
    section.push_str("|:---|---:|---:|\n");

    for entry in &breakdown.entries {
        section.push_str(&format!(
            "| {} | {} | {}% |\n",
            entry.label, entry.count, entry.percent
        ));
    }
    section.push('\n');

    section
}

/// Generate the vendor section. Shares are of all records, so the
/// column does not sum to 100%.
fn generate_vendor_section(breakdown: &Breakdown) -> String {
    let mut section = String::new();

    section.push_str("## Vendor Reliance\n\n");

    if breakdown.entries.is_empty() {
        section.push_str("No sources were attributed to a tracked vendor.\n\n");
        return section;
    }

    section.push_str("Share of all records citing each vendor's data.\n\n");
    section.push_str("| Vendor | Records | Share |\n");
    section.push_str("|:---|---:|---:|\n");
    for entry in &breakdown.entries {
        section.push_str(&format!(
            "| {} | {} | {}% |\n",
            entry.label, entry.count, entry.percent
        ));
    }
    section.push('\n');

    section
}

/// Generate the per-publication-year section.
fn generate_year_section(report: &Report) -> String {
    let mut section = String::new();

    section.push_str("## Records by Publication Year\n\n");
    section.push_str("| Year | Records | Peer-reviewed | Reports | Vendor data | Other |\n");
    section.push_str("|:---|---:|---:|---:|---:|---:|\n");

    for bucket in &report.provenance.by_year {
        let percents: Vec<String> = bucket
            .by_type
            .entries
            .iter()
            .map(|e| format!("{}%", e.percent))
            .collect();
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            bucket.year,
            bucket.records,
            percents.join(" | ")
        ));
    }
    section.push('\n');

    section
}

/// Generate the energy estimates section.
fn generate_estimates_section(estimates: &EstimateSummary) -> String {
    let mut section = String::new();

    section.push_str("## Energy Estimates\n\n");
    section.push_str(&format!("- **Total estimates:** {}\n", estimates.total));
    section.push_str(&format!("- **Global:** {}\n", estimates.global));
    section.push_str(&format!("- **USA:** {}\n", estimates.usa));
    section.push_str(&format!("- **Europe:** {}\n", estimates.europe));
    section.push('\n');

    if !estimates.distributions.is_empty() {
        section.push_str("Global estimate ranges by estimate year (TWh):\n\n");
        section.push_str("| Estimate year | n | Min | Median | Max |\n");
        section.push_str("|:---|---:|---:|---:|---:|\n");
        for dist in &estimates.distributions {
            section.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                dist.year, dist.count, dist.min_twh, dist.median_twh, dist.max_twh
            ));
        }
        section.push('\n');
    }

    if estimates.excluded_outliers > 0 {
        section.push_str(&format!(
            "Excludes {} estimate(s) above the outlier ceiling.\n\n",
            estimates.excluded_outliers
        ));
    }

    section
}

/// Generate the citation-flow section.
fn generate_flow_section(edges: &[FlowEdge], max_rows: usize) -> String {
    let mut section = String::new();

    section.push_str("## Citation Flow\n\n");

    let found = edges.iter().filter(|e| e.found).count();
    let unfound = edges.len() - found;

    section.push_str(&format!("- **Distinct citation links:** {}\n", edges.len()));
    section.push_str(&format!("- **Source located:** {}\n", found));
    section.push_str(&format!("- **Source not found:** {}\n", unfound));
    section.push('\n');

    if unfound == 0 {
        return section;
    }

    // Tally the not-found sources by how many publications cite them.
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for edge in edges.iter().filter(|e| !e.found) {
        *counts.entry(edge.source.as_str()).or_default() += 1;
    }
    let mut rows: Vec<(&str, usize)> = counts.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let truncated = rows.len() > max_rows;
    rows.truncate(max_rows);

    section.push_str("Sources that could not be located:\n\n");
    section.push_str("| Source | Publications citing |\n");
    section.push_str("|:---|---:|\n");
    for (source, count) in rows {
        section.push_str(&format!("| {} | {} |\n", source, count));
    }
    section.push('\n');

    if truncated {
        section.push_str("(Remaining sources omitted; see the JSON report for the full list.)\n\n");
    }

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by provaudit*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BreakdownEntry, CitationBand, ProvenanceSummary, YearBucket, YearDistribution,
    };
    use chrono::Utc;

    fn breakdown(entries: &[(&str, usize, u32)], total: usize) -> Breakdown {
        Breakdown {
            total,
            entries: entries
                .iter()
                .map(|(label, count, percent)| BreakdownEntry {
                    label: label.to_string(),
                    count: *count,
                    percent: *percent,
                })
                .collect(),
        }
    }

    fn create_test_report() -> Report {
        Report {
            metadata: ReportMetadata {
                sources_path: "data/sources.csv".to_string(),
                estimates_path: Some("data/estimates.csv".to_string()),
                generated_at: Utc::now(),
                tool_version: "1.0.0".to_string(),
            },
            provenance: ProvenanceSummary {
                publications: 46,
                records: 676,
                by_reference_type: breakdown(
                    &[
                        ("Peer-reviewed", 210, 31),
                        ("Non-peer-reviewed report", 257, 38),
                        ("Private vendor data", 203, 30),
                        ("Other", 6, 1),
                    ],
                    676,
                ),
                by_vendor: breakdown(&[("IDC", 291, 43), ("Cisco", 203, 30)], 676),
                by_link_status: breakdown(
                    &[
                        ("Valid", 534, 79),
                        ("Broken", 74, 11),
                        ("Insufficiently specified", 68, 10),
                    ],
                    676,
                ),
                by_year: vec![YearBucket {
                    year: 2016,
                    records: 100,
                    by_type: breakdown(
                        &[
                            ("Peer-reviewed", 40, 40),
                            ("Non-peer-reviewed report", 30, 30),
                            ("Private vendor data", 25, 25),
                            ("Other", 5, 5),
                        ],
                        100,
                    ),
                }],
            },
            estimates: Some(EstimateSummary {
                total: 258,
                global: 130,
                usa: 44,
                europe: 31,
                excluded_outliers: 5,
                distributions: vec![YearDistribution {
                    year: 2020,
                    count: 24,
                    min_twh: 199.0,
                    median_twh: 400.5,
                    max_twh: 1136.0,
                }],
            }),
            flow: vec![
                FlowEdge {
                    source: "IDC".to_string(),
                    publication: "Shehabi et al., 2016".to_string(),
                    found: false,
                    band: CitationBand::Gte500,
                },
                FlowEdge {
                    source: "Koomey".to_string(),
                    publication: "Shehabi et al., 2016".to_string(),
                    found: true,
                    band: CitationBand::Gte500,
                },
            ],
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report, &ReportConfig::default());

        assert!(markdown.contains("# Provenance Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("**Publications analyzed:** 46"));
        assert!(markdown.contains("**Citation records:** 676"));
        assert!(markdown.contains("| Peer-reviewed | 210 | 31% |"));
        assert!(markdown.contains("| Non-peer-reviewed report | 257 | 38% |"));
        assert!(markdown.contains("| Broken | 74 | 11% |"));
        assert!(markdown.contains("| IDC | 291 | 43% |"));
        assert!(markdown.contains("## Energy Estimates"));
        assert!(markdown.contains("| 2020 | 24 | 199 | 400.5 | 1136 |"));
        assert!(markdown.contains("Excludes 5 estimate(s)"));
        assert!(markdown.contains("## Citation Flow"));
        assert!(markdown.contains("| IDC | 1 |"));
    }

    #[test]
    fn test_year_section_can_be_disabled() {
        let report = create_test_report();
        let options = ReportConfig {
            include_year_buckets: false,
            ..ReportConfig::default()
        };
        let markdown = generate_markdown_report(&report, &options);
        assert!(!markdown.contains("## Records by Publication Year"));
    }

    #[test]
    fn test_flow_section_truncation_note() {
        let mut report = create_test_report();
        report.flow = (0..30)
            .map(|i| FlowEdge {
                source: format!("Source {}", i),
                publication: "Pub, 2019".to_string(),
                found: false,
                band: CitationBand::Under100,
            })
            .collect();

        let options = ReportConfig {
            max_flow_rows: 10,
            ..ReportConfig::default()
        };
        let markdown = generate_markdown_report(&report, &options);
        assert!(markdown.contains("Remaining sources omitted"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"sources_path\""));
        assert!(json.contains("\"by_reference_type\""));
        assert!(json.contains("\"flow\""));
        assert!(json.contains("\"percent\": 31"));
    }

    #[test]
    fn test_markdown_without_estimates() {
        let mut report = create_test_report();
        report.estimates = None;
        report.metadata.estimates_path = None;

        let markdown = generate_markdown_report(&report, &ReportConfig::default());
        assert!(!markdown.contains("## Energy Estimates"));
        assert!(!markdown.contains("**Estimates:**"));
    }
}
