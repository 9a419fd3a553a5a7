//! Build discovery, result fetching and aggregation.

pub mod aggregator;
pub mod analysis;
pub mod fetcher;
pub mod history;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregator::{LinkBuilder, aggregate};
pub use analysis::{AnalysisOptions, TargetOutcome, analyze, failed_count, run_targets};
pub use fetcher::{FetchOptions, FetchOutcome, fetch_results};
pub use history::{BuildQuery, discover_builds};
