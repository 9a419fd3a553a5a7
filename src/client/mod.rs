//! Remote data source for projects, build history, jobs and test results.

pub mod appveyor;

use async_trait::async_trait;

use crate::error::{AnalyzerError, AnalyzerResult};
use crate::models::{Build, Job, JobTestResults, Project};

pub use appveyor::AppVeyorClient;

/// Read-only access to a CI service's build data.
///
/// Implementations perform a single attempt per call; any retry policy is
/// theirs to add and invisible to callers.
#[async_trait]
pub trait BuildSource: Send + Sync {
    /// List every project visible to the caller.
    async fn list_projects(&self) -> AnalyzerResult<Vec<Project>>;

    /// One page of build history, newest first.
    ///
    /// With `before` set, only builds whose ID is strictly lower are returned.
    async fn build_history_page(
        &self,
        project: &Project,
        branch: &str,
        before: Option<u64>,
    ) -> AnalyzerResult<Vec<Build>>;

    /// Jobs of the build with the given version.
    async fn list_jobs(&self, project: &Project, build_version: &str) -> AnalyzerResult<Vec<Job>>;

    /// Test results reported by one job.
    async fn test_results(&self, job: &Job) -> AnalyzerResult<JobTestResults>;
}

/// Look up a project by display name (case-insensitive).
pub async fn find_project(source: &dyn BuildSource, name: &str) -> AnalyzerResult<Project> {
    source
        .list_projects()
        .await?
        .into_iter()
        .find(|p| p.matches_name(name))
        .ok_or_else(|| AnalyzerError::ProjectNotFound(name.to_string()))
}
