//! Build model and status handling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::Job;

/// Build execution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    Success,
    Failed,
    Queued,
    Running,
    Cancelled,
    /// Any status not listed above ("starting", "cancelling", ...)
    Unknown,
}

impl BuildStatus {
    /// Parse a status, ignoring case. Unknown statuses map to `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "success" => Self::Success,
            "failed" => Self::Failed,
            "queued" => Self::Queued,
            "running" => Self::Running,
            "cancelled" => Self::Cancelled,
            _ => Self::Unknown,
        }
    }

    /// Convert to the string representation used by the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }

    /// A build is terminal once it either succeeded or failed.
    ///
    /// Cancelled builds are deliberately not terminal: their test results
    /// are incomplete.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

impl<'de> Deserialize<'de> for BuildStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One CI run of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    /// Numeric build identity, monotonically increasing per project
    pub build_id: u64,
    /// Sequential build number
    #[serde(default)]
    pub build_number: u64,
    /// Human version string (e.g. "1.0.11033-sshumfpu")
    pub version: String,
    /// Branch the build ran for
    pub branch: String,
    /// Execution status
    pub status: BuildStatus,
    /// Pull request ID, when the build was triggered by a pull request
    #[serde(default)]
    pub pull_request_id: Option<String>,
    /// Completion time (absent while the build is still running)
    #[serde(default)]
    pub finished: Option<DateTime<Utc>>,
    /// Commit author
    #[serde(default)]
    pub author_name: Option<String>,
    /// Jobs, only populated by the build details endpoint
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub jobs: Vec<Job>,
}

impl Build {
    /// Whether the build was triggered by a pull request.
    pub fn is_pull_request(&self) -> bool {
        self.pull_request_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty())
    }

    /// Whether the build finished strictly before `instant`.
    pub fn finished_before(&self, instant: DateTime<Utc>) -> bool {
        self.finished.is_some_and(|f| f < instant)
    }
}

/// Response of `GET /projects/{account}/{slug}/history`.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub builds: Vec<Build>,
}

/// Response of `GET /projects/{account}/{slug}/build/{version}`.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildDetailsResponse {
    pub build: Build,
}
