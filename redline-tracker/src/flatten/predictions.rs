//! Departures and arrivals at the origin stop.
//!
//! Both come from the same predictions payload and are split by direction:
//! direction 0 leaves the origin, direction 1 arrives at it.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use super::index::ResourceIndex;
use crate::domain::{
    AgencyClock, ArrivalRecord, ArrivalWindow, DepartureRecord, UNKNOWN_STOP, derive_status,
};
use crate::mbta::{FeedResponse, RawResource};

const OUTBOUND: i64 = 0;
const INBOUND: i64 = 1;

/// The bits of a prediction both directions need.
struct PredictionView<'a> {
    direction_id: Option<i64>,
    arrival_raw: Option<&'a str>,
    departure_raw: Option<&'a str>,
    arrival: Option<DateTime<Utc>>,
    departure: Option<DateTime<Utc>>,
    trip_id: Option<String>,
    vehicle_id: Option<String>,
}

impl<'a> PredictionView<'a> {
    fn read(prediction: &'a RawResource, clock: &AgencyClock) -> Self {
        let attrs = prediction.attrs();
        let arrival_raw = attrs.text("arrival_time");
        let departure_raw = attrs.text("departure_time");

        Self {
            direction_id: attrs.integer("direction_id"),
            arrival_raw,
            departure_raw,
            arrival: clock.normalize_lenient(arrival_raw),
            departure: clock.normalize_lenient(departure_raw),
            trip_id: prediction.related_id("trip").map(str::to_string),
            vehicle_id: prediction.related_id("vehicle").map(str::to_string),
        }
    }
}

/// Outbound departures, soonest first.
///
/// A prediction becomes a row when it carries at least one of a predicted
/// departure, a scheduled departure or a predicted arrival. Rows sort by
/// predicted departure, then predicted arrival, then scheduled departure;
/// rows with none of those parseable sort last, and ties keep payload order.
pub fn flatten_departures(
    response: &FeedResponse,
    clock: &AgencyClock,
    lateness_threshold: Duration,
) -> Vec<DepartureRecord> {
    let Ok(payload) = response else {
        return Vec::new();
    };
    let index = ResourceIndex::build(&payload.included);

    let mut rows: Vec<DepartureRecord> = payload
        .data
        .iter()
        .filter_map(|prediction| {
            let view = PredictionView::read(prediction, clock);
            if view.direction_id != Some(OUTBOUND) {
                return None;
            }

            let schedule = index.related_attrs(prediction, "schedule");
            let scheduled_raw = schedule.first_text(&["departure_time", "departure"]);
            if view.departure_raw.is_none() && scheduled_raw.is_none() && view.arrival_raw.is_none()
            {
                return None;
            }

            let scheduled = clock.normalize_lenient(scheduled_raw);
            let predicted = view.departure.or(view.arrival);
            let destination = index
                .related_attrs(prediction, "trip")
                .text("headsign")
                .unwrap_or_default()
                .to_string();

            Some(DepartureRecord {
                destination,
                scheduled,
                predicted,
                status: derive_status(scheduled, predicted, lateness_threshold),
                trip_id: view.trip_id,
                vehicle_id: view.vehicle_id,
            })
        })
        .collect();

    rows.sort_by_key(|row| {
        let best = row.best_time();
        (best.is_none(), best)
    });
    rows
}

/// Inbound arrivals, in payload order, with each vehicle's current stop.
///
/// `vehicles` supplies the vehicle→stop map; when it failed every row shows
/// [`UNKNOWN_STOP`].
pub fn flatten_arrivals(
    response: &FeedResponse,
    vehicles: &FeedResponse,
    clock: &AgencyClock,
    lateness_threshold: Duration,
) -> Vec<ArrivalRecord> {
    let Ok(payload) = response else {
        return Vec::new();
    };
    let index = ResourceIndex::build(&payload.included);
    let stops = vehicle_stop_map(vehicles);

    payload
        .data
        .iter()
        .filter_map(|prediction| {
            let view = PredictionView::read(prediction, clock);
            if view.direction_id != Some(INBOUND) {
                return None;
            }

            let schedule = index.related_attrs(prediction, "schedule");
            let scheduled_raw = schedule.first_text(&["arrival_time", "arrival"]);
            if view.arrival_raw.is_none() && scheduled_raw.is_none() && view.departure_raw.is_none()
            {
                return None;
            }

            let scheduled = clock.normalize_lenient(scheduled_raw);
            let predicted = view.arrival.or(view.departure);
            let current_stop = view
                .vehicle_id
                .as_deref()
                .and_then(|id| stops.get(id))
                .map(String::as_str)
                .unwrap_or(UNKNOWN_STOP)
                .to_string();

            Some(ArrivalRecord {
                current_stop,
                scheduled,
                predicted,
                status: derive_status(scheduled, predicted, lateness_threshold),
                trip_id: view.trip_id,
                vehicle_id: view.vehicle_id,
                best_time: view.arrival.or(scheduled).or(view.departure),
            })
        })
        .collect()
}

/// Arrivals whose best-available time falls inside `window`.
///
/// Rows with no usable time are left out.
pub fn arrivals_within(arrivals: &[ArrivalRecord], window: ArrivalWindow) -> Vec<ArrivalRecord> {
    arrivals
        .iter()
        .filter(|row| row.best_time.is_some_and(|t| window.contains(t)))
        .cloned()
        .collect()
}

/// Vehicle id → name of the stop it is at or approaching.
///
/// The stop's `name` is used when side-loaded, else the stop id; a vehicle
/// whose stop is not side-loaded maps to [`UNKNOWN_STOP`].
pub fn vehicle_stop_map(vehicles: &FeedResponse) -> HashMap<String, String> {
    let Ok(payload) = vehicles else {
        return HashMap::new();
    };
    let index = ResourceIndex::build(&payload.included);

    payload
        .data
        .iter()
        .map(|vehicle| {
            let name = stop_name(&index, vehicle.related_id("stop"));
            (vehicle.id.clone(), name)
        })
        .collect()
}

/// Resolve a stop reference to a display name.
pub(super) fn stop_name(index: &ResourceIndex<'_>, stop_id: Option<&str>) -> String {
    let Some(stop_id) = stop_id else {
        return UNKNOWN_STOP.to_string();
    };
    match index.get("stop", stop_id) {
        Some(stop) => stop.attrs().text("name").unwrap_or(stop_id).to_string(),
        None => UNKNOWN_STOP.to_string(),
    }
}
