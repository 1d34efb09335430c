//! Corpus aggregation and percentage statistics.
//!
//! Percentages follow the review's reporting convention: count over
//! the TOTAL RECORD COUNT, rounded to a whole percentage. The record
//! count and the publication count differ (676 records vs 46
//! publications in the reference dataset) and must never be conflated.

use crate::models::{
    Breakdown, BreakdownEntry, CitationRecord, LinkStatus, ProvenanceSummary, Publication,
    ReferenceType, YearBucket,
};
use std::collections::{BTreeMap, HashMap};

/// count / total as a whole percentage.
///
/// Callers guarantee a non-empty corpus; the loader rejects empty
/// datasets before anything reaches this point.
pub fn percent(count: usize, total: usize) -> u32 {
    debug_assert!(total > 0, "percentages over an empty corpus");
    ((count as f64 / total as f64) * 100.0).round() as u32
}

/// Flatten all citation records across publications.
pub fn all_records(publications: &[Publication]) -> Vec<&CitationRecord> {
    publications.iter().flat_map(|p| &p.records).collect()
}

/// Breakdown by reference type. Every closed-set category appears,
/// including zero counts, in declaration order.
pub fn by_reference_type(records: &[&CitationRecord], total: usize) -> Breakdown {
    let entries = ReferenceType::all()
        .iter()
        .map(|ty| {
            let count = records.iter().filter(|r| r.reference_type == *ty).count();
            BreakdownEntry {
                label: ty.label().to_string(),
                count,
                percent: percent(count, total),
            }
        })
        .collect();

    Breakdown { total, entries }
}

/// Breakdown by link status. Every closed-set category appears,
/// including zero counts, in declaration order.
pub fn by_link_status(records: &[&CitationRecord], total: usize) -> Breakdown {
    let entries = LinkStatus::all()
        .iter()
        .map(|status| {
            let count = records.iter().filter(|r| r.link_status == *status).count();
            BreakdownEntry {
                label: status.label().to_string(),
                count,
                percent: percent(count, total),
            }
        })
        .collect();

    Breakdown { total, entries }
}

/// Breakdown by vendor. Open set: only vendors present in the corpus
/// appear, highest count first. Shares are of ALL records, so vendor
/// percentages do not sum to 100 (most records have no vendor).
pub fn by_vendor(records: &[&CitationRecord], total: usize) -> Breakdown {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        if let Some(vendor) = record.vendor.as_deref() {
            *counts.entry(vendor).or_default() += 1;
        }
    }

    let mut entries: Vec<BreakdownEntry> = counts
        .into_iter()
        .map(|(label, count)| BreakdownEntry {
            label: label.to_string(),
            count,
            percent: percent(count, total),
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));

    Breakdown { total, entries }
}

/// Per-publication-year buckets, ascending by year. Each bucket
/// carries a reference-type breakdown over that year's records.
pub fn year_buckets(records: &[&CitationRecord]) -> Vec<YearBucket> {
    let mut by_year: BTreeMap<u16, Vec<&CitationRecord>> = BTreeMap::new();
    for record in records {
        by_year.entry(record.year).or_default().push(record);
    }

    by_year
        .into_iter()
        .map(|(year, year_records)| YearBucket {
            year,
            records: year_records.len(),
            by_type: by_reference_type(&year_records, year_records.len()),
        })
        .collect()
}

/// Compute the full provenance summary over the classified corpus.
pub fn summarize(publications: &[Publication]) -> ProvenanceSummary {
    let records = all_records(publications);
    let total = records.len();

    ProvenanceSummary {
        publications: publications.len(),
        records: total,
        by_reference_type: by_reference_type(&records, total),
        by_vendor: by_vendor(&records, total),
        by_link_status: by_link_status(&records, total),
        by_year: year_buckets(&records),
    }
}
