//! Service alert records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Alert severity as reported by the agency.
///
/// Levels 1..=3 have names; anything else numeric is kept as-is so that
/// unexpected levels still show up, and a missing level is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Information,
    Warning,
    Emergency,
    Unknown,
    Other(i64),
}

impl Severity {
    /// Map a raw severity level.
    ///
    /// # Examples
    ///
    /// ```
    /// use redline_tracker::domain::Severity;
    ///
    /// assert_eq!(Severity::from_level(Some(3)), Severity::Emergency);
    /// assert_eq!(Severity::from_level(None), Severity::Unknown);
    /// assert_eq!(Severity::from_level(Some(7)).to_string(), "7");
    /// ```
    pub fn from_level(level: Option<i64>) -> Self {
        match level {
            Some(1) => Severity::Information,
            Some(2) => Severity::Warning,
            Some(3) => Severity::Emergency,
            Some(n) => Severity::Other(n),
            None => Severity::Unknown,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Information => f.write_str("Information"),
            Severity::Warning => f.write_str("Warning"),
            Severity::Emergency => f.write_str("Emergency"),
            Severity::Unknown => f.write_str("Unknown"),
            Severity::Other(n) => write!(f, "{n}"),
        }
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Whether an alert is in effect at the time it was flattened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AlertStatus {
    Active,
    Inactive,
}

impl AlertStatus {
    /// An alert is active once it has started and until it ends.
    ///
    /// An alert with no start is never active; one with no end stays active.
    pub fn evaluate(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        match (start, end) {
            (Some(start), _) if now < start => AlertStatus::Inactive,
            (Some(_), Some(end)) if now >= end => AlertStatus::Inactive,
            (Some(_), _) => AlertStatus::Active,
            (None, _) => AlertStatus::Inactive,
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertStatus::Active => f.write_str("Active"),
            AlertStatus::Inactive => f.write_str("Inactive"),
        }
    }
}

/// One flattened service alert.
///
/// `status` depends on the `now` passed to the flattener, so re-flattening
/// the same payload later can give a different answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRecord {
    pub id: String,
    pub severity: Severity,
    pub description: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub status: AlertStatus,
}
