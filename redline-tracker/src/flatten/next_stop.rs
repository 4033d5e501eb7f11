//! Per-vehicle "next stop" from line-wide predictions.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::index::ResourceIndex;
use super::predictions::stop_name;
use crate::domain::{AgencyClock, NextStop};
use crate::mbta::FeedResponse;

/// For every vehicle with an upcoming prediction, the soonest one.
///
/// `predictions` must cover all stops on the line. A prediction counts when
/// it references a vehicle and its arrival (or, failing that, departure)
/// time parses and is not before `now`. The departure is only consulted
/// when the arrival is absent or empty: an arrival that is present but
/// unparseable drops the prediction even if its departure is valid. Among a vehicle's predictions the
/// earliest expected instant wins; on a tie the first in payload order is
/// kept.
///
/// Minutes behind compares the expected instant with the schedule's
/// arrival, falling back to its departure. It is `None` when the prediction
/// has no schedule.
pub fn next_stop_by_vehicle(
    predictions: &FeedResponse,
    clock: &AgencyClock,
    now: DateTime<Utc>,
) -> HashMap<String, NextStop> {
    let Ok(payload) = predictions else {
        return HashMap::new();
    };
    let index = ResourceIndex::build(&payload.included);
    let mut by_vehicle: HashMap<String, NextStop> = HashMap::new();

    for prediction in &payload.data {
        let Some(vehicle_id) = prediction.related_id("vehicle") else {
            continue;
        };

        let attrs = prediction.attrs();
        let Some(expected) =
            clock.normalize_lenient(attrs.first_text(&["arrival_time", "departure_time"]))
        else {
            continue;
        };
        if expected < now {
            continue;
        }

        let schedule = index.related_attrs(prediction, "schedule");
        let scheduled = clock.normalize_lenient(schedule.first_text(&[
            "arrival_time",
            "arrival",
            "departure_time",
            "departure",
        ]));
        let minutes_behind =
            scheduled.map(|s| (expected - s).num_milliseconds() as f64 / 60_000.0);

        let candidate = NextStop {
            stop_name: stop_name(&index, prediction.related_id("stop")),
            expected,
            minutes_behind,
        };

        match by_vehicle.entry(vehicle_id.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(candidate);
            }
            Entry::Occupied(mut slot) => {
                if candidate.expected < slot.get().expected {
                    slot.insert(candidate);
                }
            }
        }
    }

    debug!(vehicles = by_vehicle.len(), "resolved next stops");
    by_vehicle
}
