//! Folds fetched test results into per-test statistics.

use crate::models::{Project, TestOutcome, TestResultSet, TestStatsTable};

/// Builds links to the test tab of a project's builds.
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    base: String,
}

impl LinkBuilder {
    pub fn new(web_url: &str, project: &Project) -> Self {
        LinkBuilder {
            base: format!(
                "{}/project/{}/{}",
                web_url.trim_end_matches('/'),
                project.account_name,
                project.slug
            ),
        }
    }

    /// Link to the tests of the build with `version`.
    pub fn build_tests(&self, version: &str) -> String {
        format!("{}/build/{}/tests", self.base, version)
    }
}

/// Aggregate result sets into a fresh statistics table.
///
/// Entries are keyed by their raw test name. Passed and failed outcomes are
/// counted; every failure also records a link to its build. Other outcomes
/// only make sure the test shows up in the table.
pub fn aggregate(links: &LinkBuilder, sets: &[TestResultSet]) -> TestStatsTable {
    let mut table = TestStatsTable::default();

    for set in sets {
        for entry in set.entries() {
            let stats = table.bucket_mut(&entry.name);
            match entry.outcome {
                TestOutcome::Passed => stats.pass_count += 1,
                TestOutcome::Failed => {
                    stats.fail_count += 1;
                    stats
                        .failing_build_links
                        .push(links.build_tests(&set.build_version));
                }
                TestOutcome::Running | TestOutcome::Skipped | TestOutcome::Other => {}
            }
        }
    }

    table
}
