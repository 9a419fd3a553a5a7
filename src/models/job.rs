//! Build job model.

use serde::{Deserialize, Serialize};

/// A unit of work within a build (one matrix entry / test shard).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Job identity used by the `/buildjobs/{jobId}` endpoints
    pub job_id: String,
    /// Job status as reported by the API (e.g. "failed")
    #[serde(default)]
    pub status: String,
    /// Number of tests reported by the job
    #[serde(default)]
    pub tests_count: u32,
    /// Number of failed tests reported by the job
    #[serde(default)]
    pub failed_tests_count: u32,
}
