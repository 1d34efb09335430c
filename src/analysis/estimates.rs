//! Statistics over the estimates table.
//!
//! Mirrors the figures of the original review: headline counts by
//! geography group, and per-estimate-year value distributions for the
//! Global geography with the review's outlier ceiling applied (5
//! estimates between 2,000 and 8,253 TWh would otherwise dominate the
//! ranges).

use crate::models::{EnergyEstimate, EstimateSummary, YearDistribution};
use std::collections::BTreeMap;

/// Options for estimate aggregation.
#[derive(Debug, Clone)]
pub struct EstimateOptions {
    /// Geography labels counted as Europe (EU25, EU27, ...).
    pub europe: Vec<String>,
    /// Exclude estimates above this value from the distributions.
    pub exclude_above_twh: Option<f64>,
}

impl Default for EstimateOptions {
    fn default() -> Self {
        Self {
            europe: default_europe(),
            exclude_above_twh: Some(2000.0),
        }
    }
}

impl From<&crate::config::EstimatesConfig> for EstimateOptions {
    fn from(config: &crate::config::EstimatesConfig) -> Self {
        Self {
            europe: config.europe.clone(),
            exclude_above_twh: config.exclude_above_twh,
        }
    }
}

pub fn default_europe() -> Vec<String> {
    ["EU25", "EU27", "EU28", "Europe", "Western Europe"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Number of estimates covering a single geography.
pub fn geography_count(estimates: &[EnergyEstimate], geography: &str) -> usize {
    estimates.iter().filter(|e| e.geography == geography).count()
}

/// Compute the full estimate summary.
pub fn summarize(estimates: &[EnergyEstimate], options: &EstimateOptions) -> EstimateSummary {
    let europe = estimates
        .iter()
        .filter(|e| options.europe.iter().any(|g| g == &e.geography))
        .count();

    let (distributions, excluded_outliers) = distributions(estimates, options);

    EstimateSummary {
        total: estimates.len(),
        global: geography_count(estimates, "Global"),
        usa: geography_count(estimates, "USA"),
        europe,
        excluded_outliers,
        distributions,
    }
}

/// Per-estimate-year value distributions over Global estimates.
///
/// Returns the distributions and the number of outliers excluded by
/// the ceiling.
fn distributions(
    estimates: &[EnergyEstimate],
    options: &EstimateOptions,
) -> (Vec<YearDistribution>, usize) {
    let mut excluded = 0;
    let mut by_year: BTreeMap<u16, Vec<f64>> = BTreeMap::new();

    for estimate in estimates.iter().filter(|e| e.geography == "Global") {
        if let Some(ceiling) = options.exclude_above_twh {
            if estimate.value_twh > ceiling {
                excluded += 1;
                continue;
            }
        }
        by_year
            .entry(estimate.estimate_year)
            .or_default()
            .push(estimate.value_twh);
    }

    let distributions = by_year
        .into_iter()
        .map(|(year, mut values)| {
            values.sort_by(|a, b| a.total_cmp(b));
            YearDistribution {
                year,
                count: values.len(),
                min_twh: values[0],
                median_twh: median(&values),
                max_twh: values[values.len() - 1],
            }
        })
        .collect();

    (distributions, excluded)
}

/// Median of a sorted, non-empty slice. Even lengths average the two
/// central values.
fn median(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
