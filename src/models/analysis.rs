//! Run metadata: the analysed window and the finished report.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::TestStatsRow;

/// Half-open time window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        TimeWindow { start, end }
    }

    /// Window of `days` days ending at `end`.
    ///
    /// The start saturates at the earliest representable instant.
    pub fn last_days(end: DateTime<Utc>, days: u32) -> Self {
        let start = Duration::try_days(i64::from(days))
            .and_then(|span| end.checked_sub_signed(span))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        TimeWindow { start, end }
    }

    /// Check whether `instant` falls inside the window.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// A build or job whose results could not be fetched in tolerant mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFetch {
    pub build_version: String,
    /// Missing when the job list of the build itself could not be fetched
    pub job_id: Option<String>,
    pub reason: String,
}

impl std::fmt::Display for SkippedFetch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.job_id {
            Some(job) => write!(
                f,
                "build {} job {}: {}",
                self.build_version, job, self.reason
            ),
            None => write!(f, "build {}: {}", self.build_version, self.reason),
        }
    }
}

/// Everything a report sink needs to render one (project, branch) run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub project_name: String,
    pub branch: String,
    pub window: TimeWindow,
    pub generated_at: DateTime<Utc>,
    /// Number of builds whose results were requested
    pub builds_analyzed: usize,
    /// Builds/jobs left out because their fetch failed
    pub skipped: Vec<SkippedFetch>,
    /// Rows ordered by descending fail count
    pub tests: Vec<TestStatsRow>,
}

impl AnalysisReport {
    /// A report is partial when any fetch was skipped.
    pub fn is_partial(&self) -> bool {
        !self.skipped.is_empty()
    }
}
