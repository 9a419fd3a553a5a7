//! Report sinks for finished analyses.

pub mod html;
pub mod json;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::{Config, ReportFormat};
use crate::error::AnalyzerResult;
use crate::models::AnalysisReport;

pub use html::HtmlReportWriter;
pub use json::JsonReportWriter;

/// Destination for analysis reports.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Persist the report, returning where it was written.
    async fn write(&self, report: &AnalysisReport) -> AnalyzerResult<PathBuf>;
}

/// Create the sink selected by configuration.
pub fn sink_from_config(config: &Config) -> Box<dyn ReportSink> {
    match config.report_format {
        ReportFormat::Html => Box::new(HtmlReportWriter::new(config.result_root.clone())),
        ReportFormat::Json => Box::new(JsonReportWriter::new(config.result_root.clone())),
    }
}

/// `<root>/<project>/<branch>/results_<timestamp>.<extension>`
pub(crate) fn report_path(root: &Path, report: &AnalysisReport, extension: &str) -> PathBuf {
    root.join(sanitize_segment(&report.project_name))
        .join(sanitize_segment(&report.branch))
        .join(format!(
            "results_{}.{}",
            file_timestamp(report.generated_at),
            extension
        ))
}

fn file_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d%H%M%S").to_string()
}

/// Keep a name usable as a single path segment (branches like "release/1.x").
fn sanitize_segment(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}

/// Shorten a raw test name for display.
///
/// Drops the parameter list and keeps only the last two dotted segments,
/// usually `Class.Method`.
pub fn clean_test_name(name: &str) -> String {
    let name = match name.find('(') {
        Some(i) if i > 0 => &name[..i],
        _ => name,
    };

    let parts: Vec<&str> = name.split('.').collect();
    match parts.as_slice() {
        [.., class, method] => format!("{}.{}", class, method),
        _ => name.to_string(),
    }
}
