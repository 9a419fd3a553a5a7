//! End-to-end analysis of one project branch, and of every configured target.

use chrono::{DateTime, Utc};
use tracing::{error, info};

use super::aggregator::{LinkBuilder, aggregate};
use super::fetcher::{FetchOptions, fetch_results};
use super::history::{BuildQuery, discover_builds};
use crate::client::{BuildSource, find_project};
use crate::config::{Config, Target};
use crate::error::{AnalyzerError, AnalyzerResult};
use crate::models::{AnalysisReport, TimeWindow};
use crate::report::ReportSink;

/// Settings shared by every target of a run.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub window: TimeWindow,
    pub include_pull_requests: bool,
    pub fetch: FetchOptions,
    /// Web UI base URL for failing-build links
    pub web_url: String,
}

impl AnalysisOptions {
    /// Options for a window of `config.days` days ending at `now`.
    pub fn from_config(config: &Config, now: DateTime<Utc>) -> Self {
        AnalysisOptions {
            window: TimeWindow::last_days(now, config.days),
            include_pull_requests: config.include_pull_requests,
            fetch: FetchOptions {
                max_concurrent_requests: config.max_concurrent_requests,
                policy: config.fetch_policy,
            },
            web_url: config.web_url.clone(),
        }
    }
}

/// Discover builds, fetch their results and aggregate them into a report.
pub async fn analyze(
    source: &dyn BuildSource,
    project_name: &str,
    branch: &str,
    options: &AnalysisOptions,
) -> AnalyzerResult<AnalysisReport> {
    info!("Finding AppVeyor details for project '{}'", project_name);
    let project = find_project(source, project_name).await?;

    info!(
        "Getting {} builds of '{}|{}' between {} and {}",
        if options.include_pull_requests { "all" } else { "non-PR" },
        project,
        branch,
        options.window.start,
        options.window.end
    );
    let query = BuildQuery {
        branch: branch.to_string(),
        window: options.window,
        include_pull_requests: options.include_pull_requests,
    };
    let builds = discover_builds(source, &project, &query).await?;

    let outcome = fetch_results(source, &project, &builds, &options.fetch).await?;

    let links = LinkBuilder::new(&options.web_url, &project);
    let table = aggregate(&links, &outcome.sets);

    info!(
        "Aggregated {} tests ({} failures) from {} builds",
        table.len(),
        table.total_failures(),
        builds.len()
    );

    Ok(AnalysisReport {
        project_name: project_name.to_string(),
        branch: branch.to_string(),
        window: options.window,
        generated_at: Utc::now(),
        builds_analyzed: builds.len(),
        skipped: outcome.skipped,
        tests: table.sorted_by_failures(),
    })
}

/// How one target of a run ended.
#[derive(Debug)]
pub struct TargetOutcome {
    pub target: Target,
    pub result: AnalyzerResult<std::path::PathBuf>,
}

/// Analyse every target in order, writing one report per successful target.
///
/// A failed target is logged and writes no report; later targets still run.
pub async fn run_targets(
    source: &dyn BuildSource,
    sink: &dyn ReportSink,
    targets: &[Target],
    options: &AnalysisOptions,
) -> Vec<TargetOutcome> {
    let mut outcomes = Vec::with_capacity(targets.len());

    for target in targets {
        let result = match analyze(source, &target.project, &target.branch, options).await {
            Ok(report) => sink.write(&report).await,
            Err(e) => Err(e),
        };

        if let Err(ref e) = result {
            error!("Analysis of {} failed: {}", target, e);
        }
        outcomes.push(TargetOutcome {
            target: target.clone(),
            result,
        });
    }

    outcomes
}

/// Count failed targets, for the process exit status.
pub fn failed_count(outcomes: &[TargetOutcome]) -> usize {
    outcomes.iter().filter(|o| o.result.is_err()).count()
}

/// Whether a failure means the target's project is missing.
pub fn is_lookup_failure(outcome: &TargetOutcome) -> bool {
    matches!(outcome.result, Err(AnalyzerError::ProjectNotFound(_)))
}
