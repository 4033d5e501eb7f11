//! Vehicle positions for the map.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::index::ResourceIndex;
use super::next_stop::next_stop_by_vehicle;
use crate::domain::{
    AgencyClock, EnrichedVehicle, NextStop, TravelDirection, VehiclePosition, round_tenths,
};
use crate::mbta::{Attributes, FeedResponse, RawResource, value_as_f64};

/// Positions of every vehicle with usable coordinates.
///
/// Coordinates are read from `latitude`/`longitude`, or from a nested
/// `position` object when the top-level key is absent. Either coordinate
/// missing or non-numeric drops the vehicle; a bad bearing only drops the
/// bearing.
pub fn flatten_vehicle_positions(response: &FeedResponse) -> Vec<VehiclePosition> {
    let Ok(payload) = response else {
        return Vec::new();
    };

    payload.data.iter().filter_map(read_position).collect()
}

fn read_position(vehicle: &RawResource) -> Option<VehiclePosition> {
    let attrs = vehicle.attrs();
    let position = attrs.object("position").unwrap_or_else(Attributes::empty);

    let coordinate = |key: &str| {
        attrs
            .get(key)
            .or_else(|| position.get(key))
            .and_then(value_as_f64)
    };

    let (Some(latitude), Some(longitude)) = (coordinate("latitude"), coordinate("longitude"))
    else {
        debug!(vehicle = %vehicle.id, "dropping vehicle without coordinates");
        return None;
    };

    Some(VehiclePosition {
        vehicle_id: vehicle.id.clone(),
        latitude,
        longitude,
        bearing: attrs.float("bearing"),
    })
}

/// Attach destination, direction and next-stop details to each position.
///
/// Every position in `vehicles` is returned. Details that cannot be found,
/// including all next-stop fields when `next_stops` has no entry for the
/// vehicle, are filled with the placeholder.
pub fn enrich_vehicles(
    vehicles: &FeedResponse,
    next_stops: &HashMap<String, NextStop>,
    clock: &AgencyClock,
) -> Vec<EnrichedVehicle> {
    let Ok(payload) = vehicles else {
        return Vec::new();
    };
    let index = ResourceIndex::build(&payload.included);

    payload
        .data
        .iter()
        .filter_map(|vehicle| {
            let position = read_position(vehicle)?;
            let mut enriched = EnrichedVehicle::bare(position);

            let trip = index.related_attrs(vehicle, "trip");
            if let Some(headsign) = trip.text("headsign") {
                enriched.destination = headsign.to_string();
            }
            if let Some(direction_id) = trip.integer("direction_id") {
                enriched.direction = TravelDirection::from_direction_id(direction_id).to_string();
            }

            if let Some(next) = next_stops.get(&vehicle.id) {
                enriched.next_stop_name = next.stop_name.clone();
                enriched.next_stop_time_expected = clock.format_hhmm(next.expected);
                enriched.minutes_behind = next.minutes_behind.map(round_tenths);
            }

            Some(enriched)
        })
        .collect()
}

/// Positions enriched from a line-wide predictions payload.
///
/// When `predictions` is a failed fetch the positions still come back,
/// with placeholders for everything next-stop related.
pub fn flatten_enriched_vehicles(
    vehicles: &FeedResponse,
    predictions: &FeedResponse,
    clock: &AgencyClock,
    now: DateTime<Utc>,
) -> Vec<EnrichedVehicle> {
    let next_stops = next_stop_by_vehicle(predictions, clock, now);
    enrich_vehicles(vehicles, &next_stops, clock)
}
