//! Test result models representing individual test executions of a job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Test execution outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestOutcome {
    Passed,
    Failed,
    Running,
    Skipped,
    /// Outcomes we do not track ("Ignored", "Inconclusive", "NotRunnable", ...)
    Other,
}

impl TestOutcome {
    /// Parse an outcome, ignoring case. Unknown outcomes map to `Other`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "passed" => Self::Passed,
            "failed" => Self::Failed,
            "running" => Self::Running,
            "skipped" => Self::Skipped,
            _ => Self::Other,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Running => "running",
            Self::Skipped => "skipped",
            Self::Other => "other",
        }
    }
}

impl<'de> Deserialize<'de> for TestOutcome {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

impl std::fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One test execution record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResultEntry {
    /// Fully qualified test name, possibly with a parameter list
    pub name: String,
    /// Source file (usually the test assembly)
    #[serde(default)]
    pub file_name: Option<String>,
    /// Execution outcome
    pub outcome: TestOutcome,
    /// Duration in milliseconds
    #[serde(default)]
    pub duration: i64,
    /// When the result was recorded
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
}

impl TestResultEntry {
    /// Create a new entry with no file name or timing information.
    pub fn new(name: impl Into<String>, outcome: TestOutcome) -> Self {
        TestResultEntry {
            name: name.into(),
            file_name: None,
            outcome,
            duration: 0,
            created: None,
        }
    }
}

/// Response of `GET /buildjobs/{jobId}/tests`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobTestResults {
    #[serde(default)]
    pub failed: u32,
    #[serde(default)]
    pub passed: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub list: Vec<TestResultEntry>,
}

impl JobTestResults {
    /// Build results from entries, deriving the summary counters.
    pub fn from_entries(list: Vec<TestResultEntry>) -> Self {
        let passed = list
            .iter()
            .filter(|e| e.outcome == TestOutcome::Passed)
            .count() as u32;
        let failed = list
            .iter()
            .filter(|e| e.outcome == TestOutcome::Failed)
            .count() as u32;
        JobTestResults {
            failed,
            passed,
            total: list.len() as u32,
            list,
        }
    }
}

/// Test results of one job, tagged with the version of the build it ran in.
#[derive(Debug, Clone, PartialEq)]
pub struct TestResultSet {
    pub build_version: String,
    pub job_id: String,
    pub results: JobTestResults,
}

impl TestResultSet {
    pub fn new(
        build_version: impl Into<String>,
        job_id: impl Into<String>,
        results: JobTestResults,
    ) -> Self {
        TestResultSet {
            build_version: build_version.into(),
            job_id: job_id.into(),
            results,
        }
    }

    /// Iterate over the individual test entries.
    pub fn entries(&self) -> impl Iterator<Item = &TestResultEntry> {
        self.results.list.iter()
    }
}
