//! Domain models for the test analyzer.

pub mod analysis;
pub mod build;
pub mod job;
pub mod project;
pub mod test_result;
pub mod test_stats;

// Re-export commonly used types
pub use analysis::{AnalysisReport, SkippedFetch, TimeWindow};
pub use build::{Build, BuildDetailsResponse, BuildStatus, HistoryResponse};
pub use job::Job;
pub use project::Project;
pub use test_result::{JobTestResults, TestOutcome, TestResultEntry, TestResultSet};
pub use test_stats::{TestStats, TestStatsRow, TestStatsTable};
