//! Data transfer objects for dashboard requests and responses.
//!
//! Rows here are what both the JSON endpoints and the HTML page show:
//! instants already rendered in agency-local time, nulls as empty strings.

use serde::{Deserialize, Serialize};

use crate::domain::{
    AgencyClock, AlertRecord, ArrivalRecord, DepartureRecord, EnrichedVehicle, ShapeGeometry,
};

fn local_minute(clock: &AgencyClock, instant: Option<chrono::DateTime<chrono::Utc>>) -> String {
    instant.map(|t| clock.format_minute(t)).unwrap_or_default()
}

/// An alert row.
#[derive(Debug, Clone, Serialize)]
pub struct AlertRow {
    pub id: String,
    pub severity: String,
    pub description: String,
    pub start: String,
    pub end: String,
    pub status: String,
}

impl AlertRow {
    pub fn from_record(record: &AlertRecord, clock: &AgencyClock) -> Self {
        Self {
            id: record.id.clone(),
            severity: record.severity.to_string(),
            description: record.description.clone(),
            start: local_minute(clock, record.start),
            end: local_minute(clock, record.end),
            status: record.status.to_string(),
        }
    }
}

/// A departure row.
#[derive(Debug, Clone, Serialize)]
pub struct DepartureRow {
    pub destination: String,
    pub scheduled: String,
    pub predicted: String,
    pub status: String,
    pub trip_id: String,
}

impl DepartureRow {
    pub fn from_record(record: &DepartureRecord, clock: &AgencyClock) -> Self {
        Self {
            destination: record.destination.clone(),
            scheduled: local_minute(clock, record.scheduled),
            predicted: local_minute(clock, record.predicted),
            status: record.status.to_string(),
            trip_id: record.trip_id.clone().unwrap_or_default(),
        }
    }

    /// CSS class for the status cell.
    pub fn status_class(&self) -> &'static str {
        status_class(&self.status)
    }
}

/// An arrival row.
#[derive(Debug, Clone, Serialize)]
pub struct ArrivalRow {
    pub vehicle_id: String,
    pub current_stop: String,
    pub scheduled: String,
    pub predicted: String,
    pub status: String,
}

impl ArrivalRow {
    pub fn from_record(record: &ArrivalRecord, clock: &AgencyClock) -> Self {
        Self {
            vehicle_id: record.vehicle_id.clone().unwrap_or_default(),
            current_stop: record.current_stop.clone(),
            scheduled: local_minute(clock, record.scheduled),
            predicted: local_minute(clock, record.predicted),
            status: record.status.to_string(),
        }
    }

    /// CSS class for the status cell.
    pub fn status_class(&self) -> &'static str {
        status_class(&self.status)
    }
}

fn status_class(status: &str) -> &'static str {
    match status {
        "Delayed" => "status-delayed",
        "Cancelled" => "status-cancelled",
        _ => "status-on-time",
    }
}

/// Response for `GET /api/alerts`.
#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    pub alerts: Vec<AlertRow>,
    pub error: Option<String>,
}

/// Response for `GET /api/departures`.
#[derive(Debug, Serialize)]
pub struct DeparturesResponse {
    pub departures: Vec<DepartureRow>,
    pub error: Option<String>,
}

/// Response for the arrivals endpoints.
#[derive(Debug, Serialize)]
pub struct ArrivalsResponse {
    pub arrivals: Vec<ArrivalRow>,
    pub error: Option<String>,
}

/// Response for `GET /api/vehicles`.
#[derive(Debug, Serialize)]
pub struct VehiclesResponse {
    pub vehicles: Vec<EnrichedVehicle>,
    pub error: Option<String>,
}

/// Query for `GET /api/shapes/:layer`.
#[derive(Debug, Default, Deserialize)]
pub struct ShapesQuery {
    /// One geometry per route instead of every segment.
    #[serde(default)]
    pub merged: bool,
}

/// Response for `GET /api/shapes/:layer`.
#[derive(Debug, Serialize)]
pub struct ShapesResponse {
    pub layer: String,
    pub color: String,
    pub shapes: Vec<ShapeGeometry>,
}

/// Outcome of `POST /refresh` for JSON clients.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub refreshed: bool,
    pub last_refresh: Option<String>,
    pub error: Option<String>,
}

/// Form body for `POST /settings/refresh-interval`.
#[derive(Debug, Deserialize)]
pub struct IntervalForm {
    /// Minutes between automatic refreshes; 0 turns them off.
    pub minutes: f64,
}

/// Outcome of `POST /settings/refresh-interval` for JSON clients.
#[derive(Debug, Serialize)]
pub struct IntervalResponse {
    /// Effective period in seconds, after clamping; null when off.
    pub period_secs: Option<f64>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TripStatus;
    use chrono::{TimeZone, Utc};

    #[test]
    fn departure_row_formats_local_time() {
        let clock = AgencyClock::default();
        let record = DepartureRecord {
            destination: "Ashmont".into(),
            scheduled: Some(Utc.with_ymd_and_hms(2024, 1, 15, 13, 5, 0).unwrap()),
            predicted: None,
            status: TripStatus::Cancelled,
            trip_id: None,
            vehicle_id: None,
        };

        let row = DepartureRow::from_record(&record, &clock);
        assert_eq!(row.scheduled, "2024-01-15 08:05");
        assert_eq!(row.predicted, "");
        assert_eq!(row.status, "Cancelled");
        assert_eq!(row.trip_id, "");
        assert_eq!(row.status_class(), "status-cancelled");
    }

    #[test]
    fn arrival_row_status_class() {
        let clock = AgencyClock::default();
        let record = ArrivalRecord {
            current_stop: "Davis".into(),
            scheduled: None,
            predicted: Some(Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap()),
            status: TripStatus::OnTime,
            trip_id: None,
            vehicle_id: Some("R-5463".into()),
            best_time: None,
        };

        let row = ArrivalRow::from_record(&record, &clock);
        assert_eq!(row.predicted, "2024-07-01 08:00");
        assert_eq!(row.vehicle_id, "R-5463");
        assert_eq!(row.status_class(), "status-on-time");
    }

    #[test]
    fn shapes_query_defaults_to_segments() {
        let query: ShapesQuery = serde_json::from_str("{}").unwrap();
        assert!(!query.merged);
    }
}
