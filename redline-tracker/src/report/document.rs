//! The report document: a standalone HTML page.

use std::path::{Path, PathBuf};

use askama::Template;
use chrono::{DateTime, Utc};

use super::error::ReportError;
use super::markdown::markdown_to_html;

/// Heading at the top of every report.
pub const REPORT_TITLE: &str = "MBTA Red Line – Morning Commute Overview";

#[derive(Template)]
#[template(path = "report.html")]
pub struct ReportTemplate {
    pub title: String,
    pub generated_at: String,
    /// Pre-rendered, escaped HTML.
    pub body: String,
}

impl ReportTemplate {
    pub fn new(report_text: &str, generated: DateTime<Utc>) -> Self {
        Self {
            title: REPORT_TITLE.to_string(),
            generated_at: generated.format("%Y-%m-%d %H:%M UTC").to_string(),
            body: markdown_to_html(report_text),
        }
    }
}

/// Default file name for a report generated at `generated`.
pub fn default_file_name(generated: DateTime<Utc>) -> String {
    format!(
        "mbta_commute_report_{}.html",
        generated.format("%Y%m%d_%H%M%S")
    )
}

/// Render `report_text` and write it out.
///
/// Writes to `output` if given, else to a timestamped file in
/// `reports_dir`, creating the directory as needed. Returns the path
/// written.
pub async fn write_report(
    report_text: &str,
    output: Option<&Path>,
    reports_dir: &Path,
    generated: DateTime<Utc>,
) -> Result<PathBuf, ReportError> {
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => reports_dir.join(default_file_name(generated)),
    };

    let html = ReportTemplate::new(report_text, generated).render()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| ReportError::Io {
                path: parent.display().to_string(),
                source,
            })?;
    }
    tokio::fs::write(&path, html)
        .await
        .map_err(|source| ReportError::Io {
            path: path.display().to_string(),
            source,
        })?;

    Ok(path)
}
