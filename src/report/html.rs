//! HTML table report.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use super::{ReportSink, clean_test_name, report_path};
use crate::error::AnalyzerResult;
use crate::models::AnalysisReport;

/// Timestamp format of the report header.
const HEADER_DATE_FORMAT: &str = "%m-%d-%y %H:%M:%S UTC";

/// Writes reports as an HTML table under a root directory.
#[derive(Debug, Clone)]
pub struct HtmlReportWriter {
    root: PathBuf,
}

impl HtmlReportWriter {
    pub fn new(root: PathBuf) -> Self {
        HtmlReportWriter { root }
    }
}

#[async_trait]
impl ReportSink for HtmlReportWriter {
    async fn write(&self, report: &AnalysisReport) -> AnalyzerResult<PathBuf> {
        let path = report_path(&self.root, report, "html");
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&path, render(report)).await?;

        info!("Summary written to {}", path.display());
        Ok(path)
    }
}

/// Render the full report document.
pub fn render(report: &AnalysisReport) -> String {
    let mut out = format!(
        "{} {}<br/>\nStart: {}<br/>\nEnd:   {}<br/>\nBuilds: {}<br/>\n",
        escape(&report.project_name),
        escape(&report.branch),
        report.window.start.format(HEADER_DATE_FORMAT),
        report.window.end.format(HEADER_DATE_FORMAT),
        report.builds_analyzed
    );

    if report.is_partial() {
        out.push_str(&format!(
            "<p><b>PARTIAL RESULTS</b>: {} fetches failed and are not counted:</p>\n<ul>\n",
            report.skipped.len()
        ));
        for skipped in &report.skipped {
            out.push_str(&format!("<li>{}</li>\n", escape(&skipped.to_string())));
        }
        out.push_str("</ul>\n");
    }

    out.push_str("<table>\n<tr>");
    for header in ["Name", "Fail", "Pass", "FailLinks", "Owner", "Note"] {
        out.push_str(&format!("<th>{}</th>", header));
    }
    out.push_str("</tr>\n");

    for row in &report.tests {
        let links = row
            .failing_build_links
            .iter()
            .enumerate()
            .map(|(i, link)| format!("<a href=\"{}\">{}</a>", escape(link), i + 1))
            .collect::<Vec<_>>()
            .join(" ");

        out.push_str(&format!(
            "<tr><td title=\"{}\">{}</td><td>{}</td><td>{}</td><td>{}</td><td></td><td></td></tr>\n",
            escape(&row.name),
            escape(&clean_test_name(&row.name)),
            row.fail_count,
            row.pass_count,
            links
        ));
    }
    out.push_str("</table>\n");

    out
}

fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
