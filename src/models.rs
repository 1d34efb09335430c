//! Data models for the provenance tabulator.
//!
//! This module contains the core data structures: the closed-set
//! categories from the review methodology, the citation corpus, and
//! the derived report types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a citation source. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceType {
    /// Peer-reviewed publication (journal or conference).
    PeerReviewed,
    /// Non-peer-reviewed report (industry, government, NGO).
    Report,
    /// Private data from a commercial vendor (IDC, Cisco, Gartner, ...).
    VendorData,
    /// Anything else: press articles, personal communication, web pages.
    Other,
}

impl ReferenceType {
    /// Parse a dataset cell. Returns `None` for values outside the
    /// closed set; blank cells are handled by the classifier rules.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "peer-reviewed" | "peer reviewed" | "peerreviewed" => Some(ReferenceType::PeerReviewed),
            "report" | "non-peer-reviewed report" | "non-peer reviewed report" => {
                Some(ReferenceType::Report)
            }
            "vendor" | "vendor data" | "private vendor data" => Some(ReferenceType::VendorData),
            "other" => Some(ReferenceType::Other),
            _ => None,
        }
    }

    /// Label used in report tables.
    pub fn label(&self) -> &'static str {
        match self {
            ReferenceType::PeerReviewed => "Peer-reviewed",
            ReferenceType::Report => "Non-peer-reviewed report",
            ReferenceType::VendorData => "Private vendor data",
            ReferenceType::Other => "Other",
        }
    }

    /// All variants, in report order.
    pub fn all() -> [ReferenceType; 4] {
        [
            ReferenceType::PeerReviewed,
            ReferenceType::Report,
            ReferenceType::VendorData,
            ReferenceType::Other,
        ]
    }
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Whether a citation's web reference resolves. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkStatus {
    /// The reference resolves to the cited source.
    Valid,
    /// The cited URL no longer resolves.
    Broken,
    /// Cited with insufficient detail to locate the source at all.
    Unlocatable,
}

impl LinkStatus {
    /// Parse a dataset cell. Returns `None` for values outside the
    /// closed set; blank cells are handled by the classifier rules.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "valid" | "ok" | "found" => Some(LinkStatus::Valid),
            "broken" | "broken link" | "dead" => Some(LinkStatus::Broken),
            "unlocatable" | "insufficient" | "insufficiently specified" | "not found" => {
                Some(LinkStatus::Unlocatable)
            }
            _ => None,
        }
    }

    /// Label used in report tables.
    pub fn label(&self) -> &'static str {
        match self {
            LinkStatus::Valid => "Valid",
            LinkStatus::Broken => "Broken",
            LinkStatus::Unlocatable => "Insufficiently specified",
        }
    }

    /// All variants, in report order.
    pub fn all() -> [LinkStatus; 3] {
        [LinkStatus::Valid, LinkStatus::Broken, LinkStatus::Unlocatable]
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Methodological classification of an energy estimate. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    BottomUp,
    Extrapolation,
    TopDown,
    Other,
}

impl Method {
    /// Parse a dataset cell. Returns `None` for values outside the closed set.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "bottom-up" | "bottom up" => Some(Method::BottomUp),
            "extrapolation" => Some(Method::Extrapolation),
            "top-down" | "top down" => Some(Method::TopDown),
            "other" => Some(Method::Other),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Method::BottomUp => "Bottom-up",
            Method::Extrapolation => "Extrapolation",
            Method::TopDown => "Top-down",
            Method::Other => "Other",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One source reference cited by one analyzed publication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitationRecord {
    /// Identifier of the publication citing this source (e.g. "Shehabi et al., 2016").
    pub publication: String,
    /// Identifier of the cited reference within that publication.
    pub reference: String,
    /// Classified source category.
    pub reference_type: ReferenceType,
    /// Normalized vendor name, when the source is a vendor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    /// Whether the citation's web reference resolves.
    pub link_status: LinkStatus,
    /// Year the citing publication was published.
    pub year: u16,
}

/// One analyzed publication and its classified citation records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Publication {
    /// Publication identifier (author-year label).
    pub id: String,
    /// Year of publication.
    pub year: u16,
    /// Google Scholar citation count at the time of the review.
    pub scholar_citations: u32,
    /// Number of distinct energy estimates this publication contains.
    pub estimate_count: usize,
    /// The citation records belonging to this publication.
    pub records: Vec<CitationRecord>,
}

/// One energy estimate row from the estimates table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyEstimate {
    /// Publication the estimate appears in.
    pub publication: String,
    /// Geography the estimate covers (Global, USA, EU27, ...).
    pub geography: String,
    /// Methodological classification.
    pub method: Method,
    /// Year the estimate applies to.
    pub estimate_year: u16,
    /// Estimated energy use in TWh.
    pub value_twh: f64,
}

/// Citation-count band for flow diagram nodes, as in the review figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CitationBand {
    Under100,
    Gte100,
    Gte500,
    Gte1000,
}

impl CitationBand {
    pub fn from_count(count: u32) -> Self {
        if count >= 1000 {
            CitationBand::Gte1000
        } else if count >= 500 {
            CitationBand::Gte500
        } else if count >= 100 {
            CitationBand::Gte100
        } else {
            CitationBand::Under100
        }
    }
}

/// One deduplicated citation link between a grouped source and a publication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowEdge {
    /// Grouped source label (e.g. "IDC").
    pub source: String,
    /// Publication citing the source.
    pub publication: String,
    /// Whether the source could be located.
    pub found: bool,
    /// Citation-count band of the citing publication.
    pub band: CitationBand,
}

/// One row of a percentage breakdown table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    /// Category label.
    pub label: String,
    /// Number of records in this category.
    pub count: usize,
    /// count / total, rounded to a whole percentage.
    pub percent: u32,
}

/// Percentage breakdown of the corpus along one category dimension.
///
/// The denominator is always the total record count, never the
/// publication count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    /// Total number of records (the denominator).
    pub total: usize,
    /// Per-category rows. Closed-set dimensions keep declaration
    /// order; open sets (vendors) are sorted highest count first.
    pub entries: Vec<BreakdownEntry>,
}

impl Breakdown {
    /// Entry for a given label, if present.
    pub fn get(&self, label: &str) -> Option<&BreakdownEntry> {
        self.entries.iter().find(|e| e.label == label)
    }
}

/// Per-publication-year record counts with a reference-type breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearBucket {
    pub year: u16,
    pub records: usize,
    pub by_type: Breakdown,
}

/// Provenance statistics over the classified citation corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvenanceSummary {
    /// Number of analyzed publications.
    pub publications: usize,
    /// Total citation records across all publications.
    pub records: usize,
    pub by_reference_type: Breakdown,
    pub by_vendor: Breakdown,
    pub by_link_status: Breakdown,
    pub by_year: Vec<YearBucket>,
}

/// Value distribution of estimates for one estimate year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearDistribution {
    pub year: u16,
    pub count: usize,
    pub min_twh: f64,
    pub median_twh: f64,
    pub max_twh: f64,
}

/// Statistics over the estimates table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateSummary {
    /// Total number of estimates.
    pub total: usize,
    /// Estimates covering the Global geography.
    pub global: usize,
    /// Estimates covering the USA.
    pub usa: usize,
    /// Estimates covering any European geography group member.
    pub europe: usize,
    /// Number of estimates excluded from the distributions as outliers.
    pub excluded_outliers: usize,
    /// Per-estimate-year value distributions (Global geography).
    pub distributions: Vec<YearDistribution>,
}

/// Metadata about the generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Path of the sources dataset.
    pub sources_path: String,
    /// Path of the estimates dataset, when supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimates_path: Option<String>,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Tool version.
    pub tool_version: String,
}

/// The complete aggregate report. Read-only view derived from the corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub provenance: ProvenanceSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimates: Option<EstimateSummary>,
    /// Deduplicated citation-flow edges.
    pub flow: Vec<FlowEdge>,
}
