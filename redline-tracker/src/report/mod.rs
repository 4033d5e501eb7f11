//! Batch commute reporter.
//!
//! Fetches the line's alerts, predictions at the origin and destination
//! stops, and vehicles; hands them to a generative model with the user's
//! instructions; writes the reply out as an HTML document.
//!
//! Unlike the dashboard, any failed fetch stops the run.

mod document;
mod error;
mod markdown;
mod ollama;
mod prompt;
mod tables;

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use crate::config::TrackerConfig;
use crate::mbta::{FeedRequest, MbtaFeed, RawPayload};

pub use document::{REPORT_TITLE, ReportTemplate, default_file_name, write_report};
pub use error::ReportError;
pub use markdown::{Block, Span, blocks_to_html, markdown_to_html, parse_blocks, parse_inline};
pub use ollama::{OllamaClient, OllamaConfig, OllamaError};
pub use prompt::{DEFAULT_PROMPT, ReportData, build_prompt, format_data_sections};
pub use tables::{
    AlertTableRow, PredictionTableRow, VehicleTableRow, alert_table, prediction_table,
    vehicle_table,
};

/// Where a report run writes, and what it asks.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Instructions placed ahead of the data.
    pub instructions: String,
    /// Exact output file; overrides `reports_dir`.
    pub output: Option<PathBuf>,
    /// Directory for timestamped reports.
    pub reports_dir: PathBuf,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            instructions: DEFAULT_PROMPT.to_string(),
            output: None,
            reports_dir: PathBuf::from("reports"),
        }
    }
}

async fn fetch_required(
    feed: &MbtaFeed,
    request: FeedRequest,
    what: &'static str,
) -> Result<RawPayload, ReportError> {
    feed.fetch(&request)
        .await
        .map_err(|source| ReportError::Fetch { what, source })
}

/// Name of the stop the predictions are for, else its id.
fn stop_label(rows: &[PredictionTableRow], stop_id: &str) -> String {
    rows.iter()
        .map(|row| row.stop_name.as_str())
        .find(|name| !name.is_empty())
        .unwrap_or(stop_id)
        .to_string()
}

/// Fetch and tabulate everything the report needs.
///
/// Returns the tables plus the display names of the origin and destination
/// stops.
pub async fn gather_report_data(
    feed: &MbtaFeed,
    config: &TrackerConfig,
) -> Result<(ReportData, String, String), ReportError> {
    let route = config.route_id.as_str();

    let alerts = fetch_required(feed, FeedRequest::alerts(route), "alerts").await?;
    let origin = fetch_required(
        feed,
        FeedRequest::predictions_at(route, &config.origin_stop),
        "predictions at origin",
    )
    .await?;
    let destination = fetch_required(
        feed,
        FeedRequest::predictions_at(route, &config.destination_stop),
        "predictions at destination",
    )
    .await?;
    let vehicles = fetch_required(feed, FeedRequest::vehicles(route), "vehicles").await?;

    let data = ReportData {
        alerts: alert_table(&Ok(alerts)),
        origin_predictions: prediction_table(&Ok(origin)),
        destination_predictions: prediction_table(&Ok(destination)),
        vehicles: vehicle_table(&Ok(vehicles)),
    };
    let origin_name = stop_label(&data.origin_predictions, &config.origin_stop);
    let destination_name = stop_label(&data.destination_predictions, &config.destination_stop);

    info!(
        alerts = data.alerts.len(),
        origin = data.origin_predictions.len(),
        destination = data.destination_predictions.len(),
        vehicles = data.vehicles.len(),
        "gathered report data"
    );
    Ok((data, origin_name, destination_name))
}

/// Run the whole pipeline and return the path of the written report.
pub async fn run_report(
    feed: &MbtaFeed,
    ollama: &OllamaClient,
    config: &TrackerConfig,
    options: &ReportOptions,
) -> Result<PathBuf, ReportError> {
    if !ollama.has_api_key() {
        return Err(OllamaError::MissingApiKey.into());
    }

    let (data, origin_name, destination_name) = gather_report_data(feed, config).await?;
    let sections = format_data_sections(&data, &origin_name, &destination_name)?;
    let prompt = build_prompt(&options.instructions, &sections);

    info!("requesting report text");
    let reply = ollama.chat(&prompt).await?;

    let path = write_report(
        &reply,
        options.output.as_deref(),
        Path::new(&options.reports_dir),
        Utc::now(),
    )
    .await?;
    info!(path = %path.display(), "report saved");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mbta::{FetchError, MbtaClient, MbtaConfig, MockMbtaClient};

    fn mock_feed() -> MbtaFeed {
        MbtaFeed::Mock(MockMbtaClient::new("data/fixtures").unwrap())
    }

    #[tokio::test]
    async fn gathers_all_four_tables() {
        let (data, origin, destination) =
            gather_report_data(&mock_feed(), &TrackerConfig::default())
                .await
                .unwrap();

        assert!(!data.alerts.is_empty());
        assert!(!data.origin_predictions.is_empty());
        assert!(!data.destination_predictions.is_empty());
        assert!(!data.vehicles.is_empty());
        assert_eq!(origin, "Alewife");
        assert_eq!(destination, "Central");
    }

    #[tokio::test]
    async fn any_failed_fetch_stops_the_run() {
        let config = TrackerConfig {
            destination_stop: "place-nowhere".into(),
            ..TrackerConfig::default()
        };

        let err = gather_report_data(&mock_feed(), &config)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ReportError::Fetch {
                what: "predictions at destination",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn missing_mbta_key_is_reported() {
        let feed = MbtaFeed::Live(MbtaClient::new(MbtaConfig::new(None)).unwrap());

        let err = gather_report_data(&feed, &TrackerConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ReportError::Fetch {
                source: FetchError::MissingApiKey,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn missing_ollama_key_fails_before_fetching() {
        let ollama = OllamaClient::new(OllamaConfig::new(None)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let options = ReportOptions {
            reports_dir: dir.path().to_path_buf(),
            ..ReportOptions::default()
        };

        let err = run_report(&mock_feed(), &ollama, &TrackerConfig::default(), &options)
            .await
            .unwrap_err();

        assert!(matches!(err, ReportError::Ollama(OllamaError::MissingApiKey)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn stop_label_falls_back_to_id() {
        assert_eq!(stop_label(&[], "place-cntsq"), "place-cntsq");
    }
}
