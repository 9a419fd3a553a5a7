//! Concurrent fetch of job lists and per-job test results.

use futures_util::future::try_join_all;
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::{debug, info, warn};

use crate::client::BuildSource;
use crate::config::FetchPolicy;
use crate::error::{AnalyzerError, AnalyzerResult};
use crate::models::{Build, Job, Project, SkippedFetch, TestResultSet};

/// Fan-out settings for a fetch.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    /// Upper bound on remote requests in flight at once
    pub max_concurrent_requests: usize,
    pub policy: FetchPolicy,
}

/// Result sets of every job, plus whatever had to be left out.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub sets: Vec<TestResultSet>,
    pub skipped: Vec<SkippedFetch>,
}

/// Fetch test results for every job of every build.
///
/// Builds and jobs are fetched concurrently; each remote call holds one
/// permit of a semaphore sized by `max_concurrent_requests`. Sets come back
/// in build order, then job order. Under [`FetchPolicy::FailFast`] the first
/// failed request aborts the fetch.
pub async fn fetch_results(
    source: &dyn BuildSource,
    project: &Project,
    builds: &[Build],
    options: &FetchOptions,
) -> AnalyzerResult<FetchOutcome> {
    let permits = options
        .max_concurrent_requests
        .clamp(1, Semaphore::MAX_PERMITS);
    let limiter = Semaphore::new(permits);

    info!(
        "Pulling test results for {} builds ({} concurrent requests, {})",
        builds.len(),
        permits,
        options.policy
    );

    let per_build = builds
        .iter()
        .map(|build| fetch_build(source, project, build, &limiter, options.policy));
    let outcomes = try_join_all(per_build).await?;

    let mut merged = FetchOutcome::default();
    for outcome in outcomes {
        merged.sets.extend(outcome.sets);
        merged.skipped.extend(outcome.skipped);
    }

    if merged.skipped.is_empty() {
        info!("Pulled {} test result sets", merged.sets.len());
    } else {
        warn!(
            "Pulled {} test result sets, skipped {} fetches",
            merged.sets.len(),
            merged.skipped.len()
        );
    }

    Ok(merged)
}

async fn acquire(limiter: &Semaphore) -> AnalyzerResult<SemaphorePermit<'_>> {
    limiter
        .acquire()
        .await
        .map_err(|_| AnalyzerError::Transport("request limiter closed".to_string()))
}

async fn fetch_build(
    source: &dyn BuildSource,
    project: &Project,
    build: &Build,
    limiter: &Semaphore,
    policy: FetchPolicy,
) -> AnalyzerResult<FetchOutcome> {
    let jobs = {
        let _permit = acquire(limiter).await?;
        source.list_jobs(project, &build.version).await
    };

    let jobs = match jobs {
        Ok(jobs) => jobs,
        Err(e) if policy == FetchPolicy::Tolerant => {
            warn!("Skipping build {}: job list failed: {}", build.version, e);
            return Ok(FetchOutcome {
                sets: Vec::new(),
                skipped: vec![SkippedFetch {
                    build_version: build.version.clone(),
                    job_id: None,
                    reason: e.to_string(),
                }],
            });
        }
        Err(e) => return Err(e),
    };

    let per_job = jobs
        .iter()
        .map(|job| fetch_job(source, build, job, limiter, policy));
    let results = try_join_all(per_job).await?;

    let mut outcome = FetchOutcome::default();
    for result in results {
        match result {
            Ok(set) => outcome.sets.push(set),
            Err(skipped) => outcome.skipped.push(skipped),
        }
    }

    debug!(
        "Build {}: {} jobs, {} result sets",
        build.version,
        jobs.len(),
        outcome.sets.len()
    );

    Ok(outcome)
}

/// Fetch one job's results. The inner `Err` is a tolerated failure.
async fn fetch_job(
    source: &dyn BuildSource,
    build: &Build,
    job: &Job,
    limiter: &Semaphore,
    policy: FetchPolicy,
) -> AnalyzerResult<Result<TestResultSet, SkippedFetch>> {
    let results = {
        let _permit = acquire(limiter).await?;
        source.test_results(job).await
    };

    match results {
        Ok(results) => Ok(Ok(TestResultSet::new(
            build.version.clone(),
            job.job_id.clone(),
            results,
        ))),
        Err(e) if policy == FetchPolicy::Tolerant => {
            warn!(
                "Skipping job {} of build {}: {}",
                job.job_id, build.version, e
            );
            Ok(Err(SkippedFetch {
                build_version: build.version.clone(),
                job_id: Some(job.job_id.clone()),
                reason: e.to_string(),
            }))
        }
        Err(e) => Err(e),
    }
}
