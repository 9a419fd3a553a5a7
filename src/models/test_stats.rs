//! Per-test statistics aggregated over a window of builds.

use std::collections::HashMap;

use serde::Serialize;

/// Pass/fail counters for one test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TestStats {
    pub pass_count: u32,
    pub fail_count: u32,
    /// One link per failure, pointing at the failing build's test tab
    pub failing_build_links: Vec<String>,
}

/// A single row of the report, as handed to report sinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestStatsRow {
    /// Raw test name (display cleaning happens at render time)
    pub name: String,
    pub pass_count: u32,
    pub fail_count: u32,
    pub failing_build_links: Vec<String>,
}

/// Statistics keyed by raw test name.
///
/// A table is produced in one go by [`crate::services::aggregate`]; it
/// cannot be folded into again, so every run starts from zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestStatsTable {
    stats: HashMap<String, TestStats>,
}

impl TestStatsTable {
    /// Get or create the bucket for a test.
    pub(crate) fn bucket_mut(&mut self, name: &str) -> &mut TestStats {
        self.stats.entry(name.to_string()).or_default()
    }

    pub fn get(&self, name: &str) -> Option<&TestStats> {
        self.stats.get(name)
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Total failures across all tests.
    pub fn total_failures(&self) -> u64 {
        self.stats.values().map(|s| u64::from(s.fail_count)).sum()
    }

    /// Rows ordered by descending fail count.
    ///
    /// Order among rows with equal fail counts is unspecified.
    pub fn sorted_by_failures(&self) -> Vec<TestStatsRow> {
        let mut rows: Vec<TestStatsRow> = self
            .stats
            .iter()
            .map(|(name, stats)| TestStatsRow {
                name: name.clone(),
                pass_count: stats.pass_count,
                fail_count: stats.fail_count,
                failing_build_links: stats.failing_build_links.clone(),
            })
            .collect();
        rows.sort_by(|a, b| b.fail_count.cmp(&a.fail_count));
        rows
    }
}
