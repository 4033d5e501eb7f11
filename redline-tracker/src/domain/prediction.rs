//! Departure and arrival records built from predictions.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::TripStatus;

/// Sentinel for a vehicle whose current stop cannot be resolved.
pub const UNKNOWN_STOP: &str = "Unknown";

/// One outbound departure from the origin stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartureRecord {
    /// Trip headsign; empty when the trip was not side-loaded.
    pub destination: String,
    pub scheduled: Option<DateTime<Utc>>,
    /// Predicted departure, falling back to predicted arrival.
    pub predicted: Option<DateTime<Utc>>,
    pub status: TripStatus,
    pub trip_id: Option<String>,
    pub vehicle_id: Option<String>,
}

impl DepartureRecord {
    /// Best-available departure instant, used for ordering.
    pub fn best_time(&self) -> Option<DateTime<Utc>> {
        self.predicted.or(self.scheduled)
    }
}

/// One inbound arrival at the origin stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrivalRecord {
    /// Where the arriving vehicle is now, or [`UNKNOWN_STOP`].
    pub current_stop: String,
    pub scheduled: Option<DateTime<Utc>>,
    /// Predicted arrival, falling back to predicted departure.
    pub predicted: Option<DateTime<Utc>>,
    pub status: TripStatus,
    pub trip_id: Option<String>,
    pub vehicle_id: Option<String>,
    /// Predicted arrival, else scheduled arrival, else predicted departure.
    #[serde(skip)]
    pub best_time: Option<DateTime<Utc>>,
}

/// A forward-looking window `[now, now + length]`, closed at both ends.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use redline_tracker::domain::ArrivalWindow;
///
/// let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
/// let window = ArrivalWindow::new(now, Duration::minutes(10));
///
/// assert!(window.contains(now));
/// assert!(window.contains(now + Duration::minutes(10)));
/// assert!(!window.contains(now + Duration::seconds(601)));
/// assert!(!window.contains(now - Duration::seconds(1)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrivalWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl ArrivalWindow {
    pub fn new(now: DateTime<Utc>, length: Duration) -> Self {
        Self {
            start: now,
            end: now + length,
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}
