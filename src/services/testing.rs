//! In-memory build source and fixtures shared by the service unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::client::BuildSource;
use crate::error::{AnalyzerError, AnalyzerResult};
use crate::models::{
    Build, BuildStatus, Job, JobTestResults, Project, TestOutcome, TestResultEntry, TimeWindow,
};

/// Day zero of the test calendar.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn day(n: i64) -> DateTime<Utc> {
    epoch() + chrono::Duration::days(n)
}

/// Window `[day(start_day), day(end_day))`.
pub fn window_days(end_day: i64, start_day: i64) -> TimeWindow {
    TimeWindow::new(day(start_day), day(end_day))
}

pub fn project() -> Project {
    Project {
        account_id: Some(1),
        account_name: "appsvc".to_string(),
        project_id: Some(2),
        name: "azure-functions-host".to_string(),
        slug: "azure-functions-host-y8o14".to_string(),
        repository_name: Some("Azure/azure-functions-host".to_string()),
        repository_branch: Some("dev".to_string()),
    }
}

/// Build with version "1.0.{id}" finished at noon of `finished_day`.
pub fn build_at(id: u64, branch: &str, status: BuildStatus, finished_day: i64) -> Build {
    Build {
        build_id: id,
        build_number: id,
        version: format!("1.0.{}", id),
        branch: branch.to_string(),
        status,
        pull_request_id: None,
        finished: Some(day(finished_day) + chrono::Duration::hours(12)),
        author_name: None,
        jobs: Vec::new(),
    }
}

pub fn job(id: &str) -> Job {
    Job {
        job_id: id.to_string(),
        status: "success".to_string(),
        tests_count: 0,
        failed_tests_count: 0,
    }
}

pub fn results(entries: &[(&str, TestOutcome)]) -> JobTestResults {
    JobTestResults::from_entries(
        entries
            .iter()
            .map(|(name, outcome)| TestResultEntry::new(*name, *outcome))
            .collect(),
    )
}

/// Cursor semantics of the fake history endpoint.
#[derive(Clone, Copy, PartialEq, Eq)]
enum CursorMode {
    Exclusive,
    Inclusive,
    Ignored,
}

/// Build source backed by in-memory history, jobs and results.
pub struct FakeSource {
    projects: Vec<Project>,
    /// Newest first
    history: Vec<Build>,
    page_size: usize,
    cursor_mode: CursorMode,
    jobs: HashMap<String, Vec<Job>>,
    results: HashMap<String, JobTestResults>,
    failing: HashSet<String>,
    delay: Duration,
    history_requests: Mutex<Vec<Option<u64>>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeSource {
    pub fn new(mut history: Vec<Build>, page_size: usize) -> Self {
        history.sort_by(|a, b| b.build_id.cmp(&a.build_id));
        FakeSource {
            projects: vec![project()],
            history,
            page_size,
            cursor_mode: CursorMode::Exclusive,
            jobs: HashMap::new(),
            results: HashMap::new(),
            failing: HashSet::new(),
            delay: Duration::ZERO,
            history_requests: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_inclusive_cursor(mut self) -> Self {
        self.cursor_mode = CursorMode::Inclusive;
        self
    }

    pub fn with_ignored_cursor(mut self) -> Self {
        self.cursor_mode = CursorMode::Ignored;
        self
    }

    /// Register a job of the build with `version` and its results.
    pub fn with_job(mut self, version: &str, job_id: &str, results: JobTestResults) -> Self {
        self.jobs
            .entry(version.to_string())
            .or_default()
            .push(job(job_id));
        self.results.insert(job_id.to_string(), results);
        self
    }

    /// Make requests for this build version or job ID fail.
    pub fn failing(mut self, key: &str) -> Self {
        self.failing.insert(key.to_string());
        self
    }

    /// Delay every job/test request, so concurrent requests overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn history_requests(&self) -> Vec<Option<u64>> {
        self.history_requests.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn track<T>(&self, key: &str, value: Option<T>) -> AnalyzerResult<T> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(key) {
            return Err(AnalyzerError::Status {
                url: format!("fake://{}", key),
                status: 500,
            });
        }
        value.ok_or_else(|| AnalyzerError::Status {
            url: format!("fake://{}", key),
            status: 404,
        })
    }
}

#[async_trait]
impl BuildSource for FakeSource {
    async fn list_projects(&self) -> AnalyzerResult<Vec<Project>> {
        Ok(self.projects.clone())
    }

    async fn build_history_page(
        &self,
        _project: &Project,
        _branch: &str,
        before: Option<u64>,
    ) -> AnalyzerResult<Vec<Build>> {
        self.history_requests.lock().unwrap().push(before);

        let page = self
            .history
            .iter()
            .filter(|b| match (self.cursor_mode, before) {
                (CursorMode::Exclusive, Some(c)) => b.build_id < c,
                (CursorMode::Inclusive, Some(c)) => b.build_id <= c,
                _ => true,
            })
            .take(self.page_size)
            .cloned()
            .collect();
        Ok(page)
    }

    async fn list_jobs(&self, _project: &Project, build_version: &str) -> AnalyzerResult<Vec<Job>> {
        let jobs = Some(self.jobs.get(build_version).cloned().unwrap_or_default());
        self.track(build_version, jobs).await
    }

    async fn test_results(&self, job: &Job) -> AnalyzerResult<JobTestResults> {
        let results = self.results.get(&job.job_id).cloned();
        self.track(&job.job_id, results).await
    }
}
