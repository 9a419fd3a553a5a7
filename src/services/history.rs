//! Build discovery: walks build history backwards until the window start.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::client::BuildSource;
use crate::error::AnalyzerResult;
use crate::models::{Build, Project, TimeWindow};

/// Which builds of a project to collect.
#[derive(Debug, Clone)]
pub struct BuildQuery {
    pub branch: String,
    pub window: TimeWindow,
    pub include_pull_requests: bool,
}

impl BuildQuery {
    /// Check whether a build is eligible regardless of when it finished.
    fn accepts(&self, build: &Build) -> bool {
        build.branch == self.branch
            && build.status.is_terminal()
            && (self.include_pull_requests || !build.is_pull_request())
    }
}

/// Discover terminal builds of `query.branch` that finished inside the window.
///
/// History pages are requested newest first, each one anchored below the
/// lowest build ID seen so far. Paging stops at the first empty page or at
/// the first page holding an eligible build that finished before the window
/// start. Builds are returned newest first, without duplicates.
pub async fn discover_builds(
    source: &dyn BuildSource,
    project: &Project,
    query: &BuildQuery,
) -> AnalyzerResult<Vec<Build>> {
    let mut cursor: Option<u64> = None;
    let mut seen: HashSet<u64> = HashSet::new();
    let mut collected: Vec<Build> = Vec::new();
    let mut pages = 0usize;

    loop {
        let page = source
            .build_history_page(project, &query.branch, cursor)
            .await?;
        pages += 1;

        let Some(page_min) = page.iter().map(|b| b.build_id).min() else {
            debug!("History exhausted after {} pages", pages);
            break;
        };

        let mut reached_cutoff = false;
        for build in page {
            if !query.accepts(&build) {
                continue;
            }
            if build.finished_before(query.window.start) {
                reached_cutoff = true;
            }
            if seen.insert(build.build_id) {
                collected.push(build);
            }
        }

        debug!(
            "History page {}: lowest id {}, {} builds collected so far",
            pages,
            page_min,
            collected.len()
        );

        if reached_cutoff {
            break;
        }

        // Every request must move further back, or the remote is ignoring the cursor.
        if cursor.is_some_and(|c| page_min >= c) {
            warn!(
                "History for {}|{} did not advance past build {}, stopping",
                project, query.branch, page_min
            );
            break;
        }
        cursor = Some(cursor.map_or(page_min, |c| c.min(page_min)));
    }

    collected.retain(|b| b.finished.is_some_and(|f| query.window.contains(f)));
    collected.sort_by(|a, b| b.build_id.cmp(&a.build_id));

    info!(
        "Found {} eligible {} builds for {}|{} in {} history pages",
        collected.len(),
        if query.include_pull_requests { "(all)" } else { "non-PR" },
        project,
        query.branch,
        pages
    );

    Ok(collected)
}
