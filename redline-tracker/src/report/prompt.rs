//! Prompt assembly for the commute report.

use serde::Serialize;

use super::tables::{AlertTableRow, PredictionTableRow, VehicleTableRow};

/// Instructions sent ahead of the data when no prompt file is given.
pub const DEFAULT_PROMPT: &str = "\
Hi! I'm a commuter on the Boston MBTA Red Line.
I need you to help me create a morning commute report based on real-time data from the MBTA API.
The data you are provided is in JSON format. Synthesize the data into a readable report.
The report should be written in a friendly, conversational tone. Maximum length should be half a page.
Include the following information in the report:
- Service alerts on the Red Line
- A rollup table of data on outbound trains from Alewife:
  - Train ID
  - Destination
  - Scheduled Departure Time from Alewife
  - Estimated Departure Time from Alewife
  - On Time Status
  - Estimated Time to Destination Central Square";

/// The tables the model reasons over.
#[derive(Debug, Default)]
pub struct ReportData {
    pub alerts: Vec<AlertTableRow>,
    pub origin_predictions: Vec<PredictionTableRow>,
    pub destination_predictions: Vec<PredictionTableRow>,
    pub vehicles: Vec<VehicleTableRow>,
}

fn section<T: Serialize>(title: &str, rows: &[T]) -> Result<String, serde_json::Error> {
    Ok(format!("## {title}\n{}", serde_json::to_string(rows)?))
}

/// Render the tables as titled JSON sections separated by blank lines.
///
/// Each section is `## <title>` followed by the rows as a JSON array on one
/// line; an empty table is `[]`.
pub fn format_data_sections(
    data: &ReportData,
    origin_name: &str,
    destination_name: &str,
) -> Result<String, serde_json::Error> {
    let sections = [
        section("Alerts", &data.alerts)?,
        section(&format!("Predictions at {origin_name}"), &data.origin_predictions)?,
        section(
            &format!("Predictions at {destination_name}"),
            &data.destination_predictions,
        )?,
        section("Vehicles", &data.vehicles)?,
    ];
    Ok(sections.join("\n\n"))
}

/// Instructions, a divider, then the data.
pub fn build_prompt(instructions: &str, data_sections: &str) -> String {
    format!("{}\n\n---\nData:\n{}", instructions.trim(), data_sections)
}
