//! JSON report, for feeding results into other tooling.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use super::{ReportSink, clean_test_name, report_path};
use crate::error::AnalyzerResult;
use crate::models::{AnalysisReport, TestStatsRow};

/// Writes reports as pretty-printed JSON under a root directory.
#[derive(Debug, Clone)]
pub struct JsonReportWriter {
    root: PathBuf,
}

impl JsonReportWriter {
    pub fn new(root: PathBuf) -> Self {
        JsonReportWriter { root }
    }
}

/// Report document with display names next to raw ones.
#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    report: &'a AnalysisReport,
    partial: bool,
    display_names: Vec<DisplayName<'a>>,
}

#[derive(Serialize)]
struct DisplayName<'a> {
    name: &'a str,
    display_name: String,
}

impl<'a> JsonReport<'a> {
    fn new(report: &'a AnalysisReport) -> Self {
        JsonReport {
            report,
            partial: report.is_partial(),
            display_names: report
                .tests
                .iter()
                .map(|row: &TestStatsRow| DisplayName {
                    name: &row.name,
                    display_name: clean_test_name(&row.name),
                })
                .collect(),
        }
    }
}

/// Serialize the report document.
pub fn render(report: &AnalysisReport) -> AnalyzerResult<String> {
    Ok(serde_json::to_string_pretty(&JsonReport::new(report))?)
}

#[async_trait]
impl ReportSink for JsonReportWriter {
    async fn write(&self, report: &AnalysisReport) -> AnalyzerResult<PathBuf> {
        let path = report_path(&self.root, report, "json");
        let body = render(report)?;
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&path, body).await?;

        info!("Summary written to {}", path.display());
        Ok(path)
    }
}
