//! Analysis stages: corpus aggregation, estimate statistics, and
//! citation-flow extraction.

pub mod aggregator;
pub mod estimates;
pub mod flow;

pub use aggregator::*;
pub use estimates::{EstimateOptions, summarize as summarize_estimates};
pub use flow::flow_edges;
