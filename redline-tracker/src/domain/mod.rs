//! Domain types for the Red Line tracker.
//!
//! Flat, immutable records produced from MBTA payloads, plus the two pieces
//! of logic they depend on: turning API timestamps into UTC instants and
//! classifying a stop event as on time, delayed or cancelled.

mod alert;
mod prediction;
mod shape;
mod status;
mod time;
mod vehicle;

pub use alert::{AlertRecord, AlertStatus, Severity};
pub use prediction::{ArrivalRecord, ArrivalWindow, DepartureRecord, UNKNOWN_STOP};
pub use shape::{ShapeGeometry, path_from_lon_lat};
pub use status::{DEFAULT_LATENESS_THRESHOLD, TripStatus, derive_status};
pub use time::{AgencyClock, DEFAULT_AGENCY_ZONE, TimeError};
pub use vehicle::{
    EnrichedVehicle, NextStop, PLACEHOLDER, TravelDirection, VehiclePosition, round_tenths,
};
