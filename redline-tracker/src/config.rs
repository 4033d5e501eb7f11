//! Line parameters shared by the dashboard and the reporter.

use chrono::Duration;
use chrono_tz::Tz;

use crate::domain::{AgencyClock, DEFAULT_AGENCY_ZONE};

const MAX_REFRESH_MINS: f64 = 24.0 * 60.0;

/// Which line and stops to track, and how to judge what comes back.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// MBTA route id.
    pub route_id: String,

    /// Stop whose departures and arrivals the dashboard shows.
    pub origin_stop: String,

    /// Second stop the commute report looks at.
    pub destination_stop: String,

    /// Zone naive timestamps are interpreted in.
    pub agency_zone: Tz,

    /// Lateness allowed before a trip counts as delayed (minutes).
    pub lateness_threshold_mins: i64,

    /// Length of the near-term arrivals window (minutes).
    pub near_term_window_mins: i64,

    /// Length of the future arrivals window (minutes).
    pub future_window_mins: i64,

    /// Alert descriptions are cut to this many characters.
    pub alert_description_limit: usize,

    /// Shortest auto-refresh interval accepted (seconds).
    /// Shorter requests are raised to this.
    pub min_refresh_secs: u64,
}

impl TrackerConfig {
    /// Clock for the configured agency zone.
    pub fn clock(&self) -> AgencyClock {
        AgencyClock::new(self.agency_zone)
    }

    /// Returns the lateness threshold as a Duration.
    pub fn lateness_threshold(&self) -> Duration {
        Duration::minutes(self.lateness_threshold_mins)
    }

    /// Returns the near-term window as a Duration.
    pub fn near_term_window(&self) -> Duration {
        Duration::minutes(self.near_term_window_mins)
    }

    /// Returns the future window as a Duration.
    pub fn future_window(&self) -> Duration {
        Duration::minutes(self.future_window_mins)
    }

    /// Returns the minimum refresh interval.
    pub fn min_refresh(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.min_refresh_secs)
    }

    /// Turn a requested auto-refresh interval in minutes into a period.
    ///
    /// Zero, negative and non-finite values switch auto-refresh off; anything
    /// else is raised to at least [`Self::min_refresh`] and capped at a day.
    pub fn refresh_period(&self, minutes: f64) -> Option<std::time::Duration> {
        if !minutes.is_finite() || minutes <= 0.0 {
            return None;
        }
        let requested = std::time::Duration::from_secs_f64(minutes.min(MAX_REFRESH_MINS) * 60.0);
        Some(requested.max(self.min_refresh()))
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            route_id: "Red".to_string(),
            origin_stop: "place-alfcl".to_string(), // Alewife
            destination_stop: "place-cntsq".to_string(), // Central Square
            agency_zone: DEFAULT_AGENCY_ZONE,
            lateness_threshold_mins: 2,
            near_term_window_mins: 10,
            future_window_mins: 60,
            alert_description_limit: 200,
            min_refresh_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = TrackerConfig::default();

        assert_eq!(config.route_id, "Red");
        assert_eq!(config.origin_stop, "place-alfcl");
        assert_eq!(config.destination_stop, "place-cntsq");
        assert_eq!(config.agency_zone, chrono_tz::America::New_York);
        assert_eq!(config.alert_description_limit, 200);
    }

    #[test]
    fn duration_methods() {
        let config = TrackerConfig::default();

        assert_eq!(config.lateness_threshold(), Duration::minutes(2));
        assert_eq!(config.near_term_window(), Duration::minutes(10));
        assert_eq!(config.future_window(), Duration::minutes(60));
        assert_eq!(config.min_refresh(), std::time::Duration::from_secs(30));
    }

    #[test]
    fn refresh_period_off() {
        let config = TrackerConfig::default();

        assert_eq!(config.refresh_period(0.0), None);
        assert_eq!(config.refresh_period(-1.0), None);
        assert_eq!(config.refresh_period(f64::NAN), None);
    }

    #[test]
    fn refresh_period_clamped_to_minimum() {
        let config = TrackerConfig::default();

        assert_eq!(
            config.refresh_period(0.1),
            Some(std::time::Duration::from_secs(30))
        );
        assert_eq!(
            config.refresh_period(2.0),
            Some(std::time::Duration::from_secs(120))
        );
        assert_eq!(
            config.refresh_period(1e12),
            Some(std::time::Duration::from_secs(86_400))
        );
    }

    #[test]
    fn clock_uses_zone() {
        let config = TrackerConfig {
            agency_zone: chrono_tz::Europe::London,
            ..TrackerConfig::default()
        };
        assert_eq!(config.clock().zone(), chrono_tz::Europe::London);
    }
}
