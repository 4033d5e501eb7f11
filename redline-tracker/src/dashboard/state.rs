//! Application state for the dashboard.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::refresh::RefresherHandle;
use crate::cache::CachedFeed;
use crate::config::TrackerConfig;
use crate::domain::{AlertRecord, ArrivalRecord, DepartureRecord, EnrichedVehicle};

/// Everything the dashboard shows, as of one refresh.
///
/// Never mutated in place: each refresh builds a new snapshot and swaps it
/// in, so readers always see a consistent set of tables.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub alerts: Vec<AlertRecord>,
    pub departures: Vec<DepartureRecord>,
    pub near_term: Vec<ArrivalRecord>,
    pub future: Vec<ArrivalRecord>,
    pub vehicles: Vec<EnrichedVehicle>,

    /// Message from the first failed call of the latest cycle. The tables
    /// above are then those of the last successful cycle.
    pub error: Option<String>,

    /// When the last successful cycle finished fetching.
    pub last_refresh: Option<DateTime<Utc>>,

    /// Successful cycles so far.
    pub cycles: u64,
}

/// The dashboard's mutable state: the current snapshot and the
/// auto-refresh period.
#[derive(Debug, Default)]
pub struct DashboardState {
    snapshot: RwLock<Arc<Snapshot>>,
    refresh_period: RwLock<Option<Duration>>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current snapshot.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.read().await.clone()
    }

    /// Replace the snapshot wholesale.
    pub async fn publish(&self, snapshot: Snapshot) {
        *self.snapshot.write().await = Arc::new(snapshot);
    }

    /// Record a failed cycle, keeping the previous tables.
    pub async fn fail(&self, message: String) {
        let mut current = self.snapshot.write().await;
        let mut next = Snapshot::clone(&current);
        next.error = Some(message);
        *current = Arc::new(next);
    }

    pub async fn refresh_period(&self) -> Option<Duration> {
        *self.refresh_period.read().await
    }

    pub(super) async fn set_refresh_period(&self, period: Option<Duration>) {
        *self.refresh_period.write().await = period;
    }
}

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// MBTA feed with cached shapes
    pub feed: Arc<CachedFeed>,

    /// Line parameters
    pub config: Arc<TrackerConfig>,

    /// Latest snapshot and refresh settings
    pub dashboard: Arc<DashboardState>,

    /// Channel to the background refresher
    pub refresher: RefresherHandle,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        feed: Arc<CachedFeed>,
        config: Arc<TrackerConfig>,
        dashboard: Arc<DashboardState>,
        refresher: RefresherHandle,
    ) -> Self {
        Self {
            feed,
            config,
            dashboard,
            refresher,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fail_keeps_tables() {
        let state = DashboardState::new();
        state
            .publish(Snapshot {
                cycles: 1,
                last_refresh: Some(Utc::now()),
                ..Snapshot::default()
            })
            .await;

        state.fail("API request failed: status 500: boom".into()).await;

        let snapshot = state.snapshot().await;
        assert_eq!(snapshot.cycles, 1);
        assert!(snapshot.last_refresh.is_some());
        assert_eq!(
            snapshot.error.as_deref(),
            Some("API request failed: status 500: boom")
        );
    }

    #[tokio::test]
    async fn publish_replaces_snapshot() {
        let state = DashboardState::new();
        let before = state.snapshot().await;

        state
            .publish(Snapshot {
                cycles: 2,
                ..Snapshot::default()
            })
            .await;

        assert_eq!(before.cycles, 0);
        assert_eq!(state.snapshot().await.cycles, 2);
    }
}
