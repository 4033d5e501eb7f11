//! Vehicle positions and their hover metadata.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Placeholder for enrichment fields with no data.
pub const PLACEHOLDER: &str = "—";

/// A vehicle on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehiclePosition {
    pub vehicle_id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Heading in degrees, if reported.
    pub bearing: Option<f64>,
}

/// Travel direction on the line, from the binary direction flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TravelDirection {
    Southbound,
    Northbound,
}

impl TravelDirection {
    /// Direction 0 runs south; every other value runs north.
    pub fn from_direction_id(direction_id: i64) -> Self {
        if direction_id == 0 {
            TravelDirection::Southbound
        } else {
            TravelDirection::Northbound
        }
    }
}

impl fmt::Display for TravelDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TravelDirection::Southbound => f.write_str("Southbound"),
            TravelDirection::Northbound => f.write_str("Northbound"),
        }
    }
}

/// The next stop a vehicle is predicted to reach.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextStop {
    pub stop_name: String,
    pub expected: DateTime<Utc>,
    /// Signed; positive means late. `None` without a schedule to compare.
    pub minutes_behind: Option<f64>,
}

/// A vehicle position with destination and next-stop details.
///
/// Every field that could not be resolved holds [`PLACEHOLDER`] (or `None`
/// for `minutes_behind`); a vehicle is never dropped for lack of metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedVehicle {
    #[serde(flatten)]
    pub position: VehiclePosition,
    pub destination: String,
    pub direction: String,
    pub next_stop_name: String,
    /// Agency-local `HH:MM`.
    pub next_stop_time_expected: String,
    /// Rounded to one decimal place.
    pub minutes_behind: Option<f64>,
}

impl EnrichedVehicle {
    /// A position with every enrichment field set to the placeholder.
    pub fn bare(position: VehiclePosition) -> Self {
        Self {
            position,
            destination: PLACEHOLDER.to_string(),
            direction: PLACEHOLDER.to_string(),
            next_stop_name: PLACEHOLDER.to_string(),
            next_stop_time_expected: PLACEHOLDER.to_string(),
            minutes_behind: None,
        }
    }
}

/// Round to one decimal place.
pub fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_flag() {
        assert_eq!(
            TravelDirection::from_direction_id(0),
            TravelDirection::Southbound
        );
        assert_eq!(
            TravelDirection::from_direction_id(1),
            TravelDirection::Northbound
        );
        assert_eq!(TravelDirection::from_direction_id(1).to_string(), "Northbound");
    }

    #[test]
    fn rounding() {
        assert_eq!(round_tenths(2.25), 2.3);
        assert_eq!(round_tenths(-1.04), -1.0);
        assert_eq!(round_tenths(0.0), 0.0);
    }

    #[test]
    fn bare_uses_placeholders() {
        let v = EnrichedVehicle::bare(VehiclePosition {
            vehicle_id: "R-1".into(),
            latitude: 42.0,
            longitude: -71.0,
            bearing: None,
        });
        assert_eq!(v.destination, PLACEHOLDER);
        assert_eq!(v.next_stop_time_expected, PLACEHOLDER);
        assert!(v.minutes_behind.is_none());
    }

    #[test]
    fn serializes_flat() {
        let v = EnrichedVehicle::bare(VehiclePosition {
            vehicle_id: "R-1".into(),
            latitude: 42.0,
            longitude: -71.0,
            bearing: Some(90.0),
        });
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["vehicle_id"], "R-1");
        assert_eq!(json["bearing"], 90.0);
        assert_eq!(json["direction"], "—");
    }
}
