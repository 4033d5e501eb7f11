//! Timestamp normalization for MBTA data.
//!
//! Predictions usually carry an explicit UTC offset while some schedule
//! fields arrive naive. A naive timestamp is wall-clock time at the agency,
//! so it only becomes comparable once it has been placed in the agency's
//! zone. This module turns every accepted representation into a single
//! absolute instant in UTC.

use std::borrow::Cow;

use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;
use tracing::debug;

/// Zone naive MBTA timestamps are interpreted in.
pub const DEFAULT_AGENCY_ZONE: Tz = chrono_tz::America::New_York;

/// Error returned when a timestamp cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timestamp {input:?}: {reason}")]
pub struct TimeError {
    input: String,
    reason: &'static str,
}

impl TimeError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

/// Formats carrying an explicit offset (after `Z` has been rewritten).
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Formats without an offset: agency local time.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// The agency's civil clock.
///
/// Holds the IANA zone used for naive timestamps and for formatting
/// instants back into rider-facing local times.
///
/// # Examples
///
/// ```
/// use redline_tracker::domain::AgencyClock;
///
/// let clock = AgencyClock::default();
///
/// let offset = clock.parse("2024-01-01T08:00:00-05:00").unwrap();
/// let utc = clock.parse("2024-01-01T13:00:00Z").unwrap();
/// assert_eq!(offset, utc);
///
/// // Naive summer time in Boston is UTC-4
/// let naive = clock.parse("2024-07-01T08:00:00").unwrap();
/// assert_eq!(naive.to_rfc3339(), "2024-07-01T12:00:00+00:00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgencyClock {
    zone: Tz,
}

impl Default for AgencyClock {
    fn default() -> Self {
        Self::new(DEFAULT_AGENCY_ZONE)
    }
}

impl AgencyClock {
    /// Create a clock for the given zone.
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }

    /// Create a clock from an IANA zone name such as `"America/New_York"`.
    pub fn from_zone_name(name: &str) -> Result<Self, TimeError> {
        name.parse::<Tz>()
            .map(Self::new)
            .map_err(|_| TimeError::new(name, "unknown IANA zone"))
    }

    /// Returns the agency zone.
    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Normalize an optional timestamp.
    ///
    /// `None` and empty strings map to `None`. Anything else must parse.
    pub fn normalize(&self, input: Option<&str>) -> Result<Option<DateTime<Utc>>, TimeError> {
        match input.map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => self.parse(s).map(Some),
        }
    }

    /// Normalize, substituting `None` for malformed input.
    ///
    /// A single bad timestamp must not take down the rest of a payload, so
    /// the flatteners go through this and log what they dropped.
    pub fn normalize_lenient(&self, input: Option<&str>) -> Option<DateTime<Utc>> {
        match self.normalize(input) {
            Ok(instant) => instant,
            Err(e) => {
                debug!(error = %e, "dropping unparseable timestamp");
                None
            }
        }
    }

    /// Parse one ISO-8601 timestamp into UTC.
    pub fn parse(&self, input: &str) -> Result<DateTime<Utc>, TimeError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(TimeError::new(input, "empty timestamp"));
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Utc));
        }

        let s = rewrite_zulu(s);

        for format in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::<FixedOffset>::parse_from_str(&s, format) {
                return Ok(dt.with_timezone(&Utc));
            }
        }

        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(&s, format) {
                return self
                    .localize_naive(naive)
                    .ok_or_else(|| TimeError::new(input, "local time out of range"));
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
            return self
                .localize_naive(date.and_time(chrono::NaiveTime::MIN))
                .ok_or_else(|| TimeError::new(input, "local time out of range"));
        }

        Err(TimeError::new(input, "not an ISO-8601 timestamp"))
    }

    /// Place a naive wall-clock time in the agency zone and convert to UTC.
    ///
    /// Ambiguous times (clocks going back) resolve to the earlier instant.
    /// Times inside a spring-forward gap use the offset in force before the
    /// gap, so 02:30 on a changeover morning lands at 03:30 daylight time.
    fn localize_naive(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self.zone.from_local_datetime(&naive) {
            LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
            LocalResult::None => {
                let before = naive.checked_sub_signed(Duration::hours(1))?;
                let offset = self
                    .zone
                    .offset_from_local_datetime(&before)
                    .earliest()?
                    .fix();
                let utc = naive.checked_sub_signed(Duration::seconds(i64::from(
                    offset.local_minus_utc(),
                )))?;
                Some(Utc.from_utc_datetime(&utc))
            }
        }
    }

    /// Convert an instant into agency local time.
    pub fn localize(&self, instant: DateTime<Utc>) -> DateTime<Tz> {
        instant.with_timezone(&self.zone)
    }

    /// Local time of day, `HH:MM`.
    pub fn format_hhmm(&self, instant: DateTime<Utc>) -> String {
        self.localize(instant).format("%H:%M").to_string()
    }

    /// Local date and minute, `YYYY-MM-DD HH:MM`.
    pub fn format_minute(&self, instant: DateTime<Utc>) -> String {
        self.localize(instant).format("%Y-%m-%d %H:%M").to_string()
    }

    /// Local timestamp with zone abbreviation, `YYYY-MM-DD HH:MM:SS EST`.
    pub fn format_stamp(&self, instant: DateTime<Utc>) -> String {
        self.localize(instant)
            .format("%Y-%m-%d %H:%M:%S %Z")
            .to_string()
    }
}

/// Rewrite a trailing `Z` as `+00:00` so the offset formats accept it.
fn rewrite_zulu(s: &str) -> Cow<'_, str> {
    match s.strip_suffix(['Z', 'z']) {
        Some(stripped) => Cow::Owned(format!("{stripped}+00:00")),
        None => Cow::Borrowed(s),
    }
}
