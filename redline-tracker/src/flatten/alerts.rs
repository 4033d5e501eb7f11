//! Service alerts.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::{AgencyClock, AlertRecord, AlertStatus, Severity};
use crate::mbta::{Attributes, FeedResponse};

/// Flatten an alerts payload.
///
/// Only the first active period is considered. Status is evaluated
/// against `now`.
pub fn flatten_alerts(
    response: &FeedResponse,
    clock: &AgencyClock,
    now: DateTime<Utc>,
    description_limit: usize,
) -> Vec<AlertRecord> {
    let Ok(payload) = response else {
        return Vec::new();
    };

    payload
        .data
        .iter()
        .map(|alert| {
            let attrs = alert.attrs();

            let description = attrs
                .first_text(&["description", "short_header", "header"])
                .map(|d| d.chars().take(description_limit).collect::<String>())
                .unwrap_or_default();

            let period = attrs
                .array("active_period")
                .and_then(|periods| periods.first())
                .and_then(Value::as_object)
                .map(Attributes::new)
                .unwrap_or_else(Attributes::empty);
            let start = clock.normalize_lenient(period.text("start"));
            let end = clock.normalize_lenient(period.text("end"));

            AlertRecord {
                id: alert.id.clone(),
                severity: Severity::from_level(attrs.integer("severity")),
                description,
                start,
                end,
                status: AlertStatus::evaluate(start, end, now),
            }
        })
        .collect()
}
