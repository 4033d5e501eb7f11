//! On-time classification for a single stop event.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Default lateness allowed before a trip counts as delayed.
pub const DEFAULT_LATENESS_THRESHOLD: Duration = Duration::minutes(2);

/// How a predicted stop event compares with its schedule.
///
/// There is no "early" state: running ahead of schedule is on time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TripStatus {
    #[serde(rename = "On Time")]
    OnTime,
    Delayed,
    Cancelled,
}

impl TripStatus {
    /// Rider-facing label.
    pub fn label(self) -> &'static str {
        match self {
            TripStatus::OnTime => "On Time",
            TripStatus::Delayed => "Delayed",
            TripStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a stop event.
///
/// Rules, applied in order:
/// 1. no predicted/actual instant: [`TripStatus::Cancelled`]
/// 2. no scheduled instant: [`TripStatus::OnTime`]
/// 3. `actual - scheduled <= threshold`: [`TripStatus::OnTime`], otherwise
///    [`TripStatus::Delayed`]
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use redline_tracker::domain::{TripStatus, derive_status};
///
/// let sched = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
/// let threshold = Duration::minutes(2);
///
/// assert_eq!(derive_status(Some(sched), None, threshold), TripStatus::Cancelled);
/// assert_eq!(
///     derive_status(Some(sched), Some(sched + Duration::seconds(121)), threshold),
///     TripStatus::Delayed
/// );
/// ```
pub fn derive_status(
    scheduled: Option<DateTime<Utc>>,
    actual: Option<DateTime<Utc>>,
    threshold: Duration,
) -> TripStatus {
    let Some(actual) = actual else {
        return TripStatus::Cancelled;
    };
    let Some(scheduled) = scheduled else {
        return TripStatus::OnTime;
    };

    if actual - scheduled <= threshold {
        TripStatus::OnTime
    } else {
        TripStatus::Delayed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn derive(scheduled: Option<DateTime<Utc>>, actual: Option<DateTime<Utc>>) -> TripStatus {
        derive_status(scheduled, actual, DEFAULT_LATENESS_THRESHOLD)
    }

    #[test]
    fn no_prediction_is_cancelled() {
        assert_eq!(derive(Some(t()), None), TripStatus::Cancelled);
        assert_eq!(derive(None, None), TripStatus::Cancelled);
    }

    #[test]
    fn no_schedule_is_on_time() {
        assert_eq!(derive(None, Some(t())), TripStatus::OnTime);
    }

    #[test]
    fn exact_match_is_on_time() {
        assert_eq!(derive(Some(t()), Some(t())), TripStatus::OnTime);
    }

    #[test]
    fn threshold_boundary() {
        let late_119 = t() + Duration::seconds(119);
        let late_120 = t() + Duration::seconds(120);
        let late_121 = t() + Duration::seconds(121);

        assert_eq!(derive(Some(t()), Some(late_119)), TripStatus::OnTime);
        assert_eq!(derive(Some(t()), Some(late_120)), TripStatus::OnTime);
        assert_eq!(derive(Some(t()), Some(late_121)), TripStatus::Delayed);
    }

    #[test]
    fn early_is_on_time() {
        let early = t() - Duration::seconds(60);
        assert_eq!(derive(Some(t()), Some(early)), TripStatus::OnTime);
    }

    #[test]
    fn custom_threshold() {
        let late = t() + Duration::minutes(4);
        assert_eq!(
            derive_status(Some(t()), Some(late), Duration::minutes(5)),
            TripStatus::OnTime
        );
        assert_eq!(
            derive_status(Some(t()), Some(late), Duration::zero()),
            TripStatus::Delayed
        );
    }

    #[test]
    fn labels() {
        assert_eq!(TripStatus::OnTime.to_string(), "On Time");
        assert_eq!(TripStatus::Delayed.to_string(), "Delayed");
        assert_eq!(TripStatus::Cancelled.to_string(), "Cancelled");
        assert_eq!(
            serde_json::to_string(&TripStatus::OnTime).unwrap(),
            "\"On Time\""
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn delayed_iff_past_threshold(delay_secs in -3600i64..3600, threshold_secs in 0i64..600) {
            let sched = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
            let actual = sched + Duration::seconds(delay_secs);
            let status = derive_status(Some(sched), Some(actual), Duration::seconds(threshold_secs));

            if delay_secs > threshold_secs {
                prop_assert_eq!(status, TripStatus::Delayed);
            } else {
                prop_assert_eq!(status, TripStatus::OnTime);
            }
        }

        #[test]
        fn never_cancelled_with_prediction(delay_secs in -3600i64..3600, has_schedule: bool) {
            let sched = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
            let actual = sched + Duration::seconds(delay_secs);
            let status = derive_status(
                has_schedule.then_some(sched),
                Some(actual),
                DEFAULT_LATENESS_THRESHOLD,
            );
            prop_assert_ne!(status, TripStatus::Cancelled);
        }
    }
}
