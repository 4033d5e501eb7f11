//! Unfiltered tables for the commute report.
//!
//! Unlike the dashboard flatteners these keep every row and pass attribute
//! values through as the API sent them: both directions, no time windows,
//! no status derivation. The model gets the raw picture.

use serde::Serialize;
use serde_json::Value;

use crate::flatten::ResourceIndex;
use crate::mbta::{Attributes, FeedResponse};

/// One alert with its full attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertTableRow {
    pub id: String,
    pub severity: Option<i64>,
    pub header: String,
    pub short_header: String,
    pub description: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    /// The `active_period` array re-encoded as JSON text; empty when absent.
    pub active_period: String,
    pub cause: Option<String>,
    pub effect: Option<String>,
    pub url: String,
}

/// One prediction joined with its schedule, trip, stop and vehicle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionTableRow {
    pub prediction_id: String,
    pub direction_id: Option<i64>,
    pub departure_time: Option<String>,
    pub arrival_time: Option<String>,
    pub schedule_departure_time: Option<String>,
    pub schedule_arrival_time: Option<String>,
    pub trip_id: Option<String>,
    pub trip_headsign: String,
    pub trip_direction_id: Option<i64>,
    pub stop_id: Option<String>,
    pub stop_name: String,
    pub vehicle_id: Option<String>,
}

/// One vehicle joined with its trip and current stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleTableRow {
    pub vehicle_id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub bearing: Option<f64>,
    pub current_stop_id: Option<String>,
    pub current_stop_name: String,
    pub trip_id: Option<String>,
    pub trip_headsign: String,
    pub trip_direction_id: Option<i64>,
    pub updated_at: Option<String>,
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

fn text_or_empty(attrs: &Attributes<'_>, key: &str) -> String {
    attrs.text(key).unwrap_or_default().to_string()
}

/// Every alert, untruncated.
pub fn alert_table(response: &FeedResponse) -> Vec<AlertTableRow> {
    let Ok(payload) = response else {
        return Vec::new();
    };

    payload
        .data
        .iter()
        .map(|alert| {
            let attrs = alert.attrs();
            AlertTableRow {
                id: alert.id.clone(),
                severity: attrs.integer("severity"),
                header: text_or_empty(&attrs, "header"),
                short_header: text_or_empty(&attrs, "short_header"),
                description: text_or_empty(&attrs, "description"),
                created_at: owned(attrs.text("created_at")),
                updated_at: owned(attrs.text("updated_at")),
                active_period: attrs
                    .get("active_period")
                    .map(Value::to_string)
                    .unwrap_or_default(),
                cause: owned(attrs.text("cause")),
                effect: owned(attrs.text("effect")),
                url: text_or_empty(&attrs, "url"),
            }
        })
        .collect()
}

/// Every prediction, both directions.
pub fn prediction_table(response: &FeedResponse) -> Vec<PredictionTableRow> {
    let Ok(payload) = response else {
        return Vec::new();
    };
    let index = ResourceIndex::build(&payload.included);

    payload
        .data
        .iter()
        .map(|prediction| {
            let attrs = prediction.attrs();
            let schedule = index.related_attrs(prediction, "schedule");
            let trip = index.related_attrs(prediction, "trip");
            let stop = index.related_attrs(prediction, "stop");

            PredictionTableRow {
                prediction_id: prediction.id.clone(),
                direction_id: attrs.integer("direction_id"),
                departure_time: owned(attrs.text("departure_time")),
                arrival_time: owned(attrs.text("arrival_time")),
                schedule_departure_time: owned(
                    schedule.first_text(&["departure_time", "departure"]),
                ),
                schedule_arrival_time: owned(schedule.first_text(&["arrival_time", "arrival"])),
                trip_id: owned(prediction.related_id("trip")),
                trip_headsign: text_or_empty(&trip, "headsign"),
                trip_direction_id: trip.integer("direction_id"),
                stop_id: owned(prediction.related_id("stop")),
                stop_name: text_or_empty(&stop, "name"),
                vehicle_id: owned(prediction.related_id("vehicle")),
            }
        })
        .collect()
}

/// Every vehicle, including those without a usable position.
pub fn vehicle_table(response: &FeedResponse) -> Vec<VehicleTableRow> {
    let Ok(payload) = response else {
        return Vec::new();
    };
    let index = ResourceIndex::build(&payload.included);

    payload
        .data
        .iter()
        .map(|vehicle| {
            let attrs = vehicle.attrs();
            let nested = attrs.object("position");
            let coordinate = |key: &str| {
                attrs
                    .float(key)
                    .or_else(|| nested.and_then(|p| p.float(key)))
            };
            let trip = index.related_attrs(vehicle, "trip");
            let stop = index.related_attrs(vehicle, "stop");

            VehicleTableRow {
                vehicle_id: vehicle.id.clone(),
                latitude: coordinate("latitude"),
                longitude: coordinate("longitude"),
                bearing: attrs.float("bearing"),
                current_stop_id: owned(vehicle.related_id("stop")),
                current_stop_name: text_or_empty(&stop, "name"),
                trip_id: owned(vehicle.related_id("trip")),
                trip_headsign: text_or_empty(&trip, "headsign"),
                trip_direction_id: trip.integer("direction_id"),
                updated_at: owned(attrs.text("updated_at")),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mbta::{FetchError, RawPayload};

    fn parse(json: &str) -> FeedResponse {
        Ok(serde_json::from_str::<RawPayload>(json).unwrap())
    }

    #[test]
    fn alerts_keep_full_text() {
        let long = "x".repeat(500);
        let resp = parse(&format!(
            r#"{{"data": [{{"type": "alert", "id": "a1", "attributes": {{
                "severity": 7, "header": "Delays", "description": "{long}",
                "active_period": [{{"start": "2024-01-15T05:00:00-05:00", "end": null}}],
                "effect": "DELAY"
            }}}}]}}"#
        ));

        let rows = alert_table(&resp);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description.len(), 500);
        assert_eq!(rows[0].severity, Some(7));
        assert_eq!(rows[0].short_header, "");
        assert!(rows[0].active_period.starts_with("[{"));
        assert_eq!(rows[0].effect.as_deref(), Some("DELAY"));
        assert_eq!(rows[0].cause, None);
    }

    #[test]
    fn predictions_keep_both_directions() {
        let resp = parse(
            r#"{
                "data": [
                    {"type": "prediction", "id": "p1",
                     "attributes": {"direction_id": 0, "departure_time": "2024-01-15T08:05:00-05:00"},
                     "relationships": {
                        "schedule": {"data": {"type": "schedule", "id": "s1"}},
                        "trip": {"data": {"type": "trip", "id": "t1"}},
                        "stop": {"data": {"type": "stop", "id": "70061"}},
                        "vehicle": {"data": null}}},
                    {"type": "prediction", "id": "p2", "attributes": {"direction_id": 1}}
                ],
                "included": [
                    {"type": "schedule", "id": "s1", "attributes": {"departure": "2024-01-15T08:04:00"}},
                    {"type": "trip", "id": "t1", "attributes": {"headsign": "Ashmont", "direction_id": 0}},
                    {"type": "stop", "id": "70061", "attributes": {"name": "Alewife"}}
                ]
            }"#,
        );

        let rows = prediction_table(&resp);
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert_eq!(first.schedule_departure_time.as_deref(), Some("2024-01-15T08:04:00"));
        assert_eq!(first.trip_headsign, "Ashmont");
        assert_eq!(first.stop_name, "Alewife");
        assert_eq!(first.vehicle_id, None);

        let second = &rows[1];
        assert_eq!(second.direction_id, Some(1));
        assert_eq!(second.trip_headsign, "");
        assert_eq!(second.trip_id, None);
    }

    #[test]
    fn vehicles_keep_rows_without_position() {
        let resp = parse(
            r#"{
                "data": [
                    {"type": "vehicle", "id": "v1", "attributes": {"position": {"latitude": 42.39, "longitude": -71.14}},
                     "relationships": {"stop": {"data": {"type": "stop", "id": "70061"}}}},
                    {"type": "vehicle", "id": "v2", "attributes": {"latitude": "north"}}
                ],
                "included": [{"type": "stop", "id": "70061", "attributes": {"name": "Alewife"}}]
            }"#,
        );

        let rows = vehicle_table(&resp);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].latitude, Some(42.39));
        assert_eq!(rows[0].current_stop_name, "Alewife");
        assert_eq!(rows[1].latitude, None);
    }

    #[test]
    fn failed_fetch_gives_empty_tables() {
        let failed: FeedResponse = Err(FetchError::MissingApiKey);
        assert!(alert_table(&failed).is_empty());
        assert!(prediction_table(&failed).is_empty());
        assert!(vehicle_table(&failed).is_empty());
    }
}
