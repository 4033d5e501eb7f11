//! Periodic and on-demand dashboard refresh.
//!
//! One background task owns the timer and performs every refresh, so two
//! cycles never run at once. A manual refresh goes through the same task
//! and pushes the timer's next deadline back by a full period, which keeps
//! a click and the timer from firing back to back.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::state::{DashboardState, Snapshot};
use crate::cache::CachedFeed;
use crate::config::TrackerConfig;
use crate::domain::{ArrivalWindow, EnrichedVehicle};
use crate::flatten::{
    arrivals_within, flatten_alerts, flatten_arrivals, flatten_departures,
    flatten_enriched_vehicles, flatten_vehicle_positions, route_segments,
};
use crate::mbta::FeedRequest;

/// A refresh cycle that could not complete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RefreshFailed {
    pub message: String,
}

/// Run one refresh cycle and publish the result.
///
/// Fetches alerts, origin predictions, vehicles and route shapes in that
/// order. If any of them failed, the first failure becomes the dashboard's
/// error banner and the previous tables stay. Otherwise the new tables are
/// published straight away, then line-wide predictions are fetched to add
/// next-stop details to the vehicles and the snapshot is published again.
pub async fn refresh_cycle(
    feed: &CachedFeed,
    config: &TrackerConfig,
    dashboard: &DashboardState,
) -> Result<(), RefreshFailed> {
    let route = config.route_id.as_str();

    let alerts = feed.fetch(&FeedRequest::alerts(route)).await;
    let predictions = feed
        .fetch(&FeedRequest::predictions_at(route, &config.origin_stop))
        .await;
    let vehicles = feed.fetch(&FeedRequest::vehicles(route)).await;
    let shapes = feed.fetch(&FeedRequest::shapes(route)).await;

    for response in [&alerts, &predictions, &vehicles, &shapes] {
        if let Err(e) = response {
            let message = e.to_string();
            warn!(error = %message, "refresh failed");
            dashboard.fail(message.clone()).await;
            return Err(RefreshFailed { message });
        }
    }

    let now = Utc::now();
    let clock = config.clock();
    let threshold = config.lateness_threshold();

    let arrivals = flatten_arrivals(&predictions, &vehicles, &clock, threshold);
    let previous = dashboard.snapshot().await;

    let snapshot = Snapshot {
        alerts: flatten_alerts(&alerts, &clock, now, config.alert_description_limit),
        departures: flatten_departures(&predictions, &clock, threshold),
        near_term: arrivals_within(&arrivals, ArrivalWindow::new(now, config.near_term_window())),
        future: arrivals_within(&arrivals, ArrivalWindow::new(now, config.future_window())),
        vehicles: flatten_vehicle_positions(&vehicles)
            .into_iter()
            .map(EnrichedVehicle::bare)
            .collect(),
        error: None,
        last_refresh: Some(now),
        cycles: previous.cycles + 1,
    };
    info!(
        alerts = snapshot.alerts.len(),
        departures = snapshot.departures.len(),
        near_term = snapshot.near_term.len(),
        vehicles = snapshot.vehicles.len(),
        "refreshed"
    );
    dashboard.publish(snapshot.clone()).await;

    let segments = route_segments(&shapes);
    if !segments.is_empty() {
        feed.store_route_shapes(route, segments).await;
    }

    let all_stops = feed.fetch(&FeedRequest::predictions_on(route)).await;
    if let Err(e) = &all_stops {
        warn!(error = %e, "line-wide predictions unavailable; vehicles keep placeholders");
    }
    let enriched = Snapshot {
        vehicles: flatten_enriched_vehicles(&vehicles, &all_stops, &clock, Utc::now()),
        ..snapshot
    };
    dashboard.publish(enriched).await;

    Ok(())
}

/// Messages to the refresher task.
#[derive(Debug)]
enum RefreshCommand {
    /// Refresh now and report the outcome.
    Now {
        reply: oneshot::Sender<Result<(), RefreshFailed>>,
    },
    /// Change the auto-refresh period; `None` turns it off.
    SetPeriod(Option<Duration>),
}

/// Cheap handle for talking to the refresher task.
#[derive(Debug, Clone)]
pub struct RefresherHandle {
    tx: mpsc::Sender<RefreshCommand>,
}

impl RefresherHandle {
    /// Refresh immediately and wait for the cycle to finish.
    pub async fn refresh_now(&self) -> Result<(), RefreshFailed> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(RefreshCommand::Now { reply })
            .await
            .map_err(|_| stopped())?;
        rx.await.map_err(|_| stopped())?
    }

    /// Change the auto-refresh period. The next timed refresh is one full
    /// period from now.
    pub async fn set_period(&self, period: Option<Duration>) -> Result<(), RefreshFailed> {
        self.tx
            .send(RefreshCommand::SetPeriod(period))
            .await
            .map_err(|_| stopped())
    }
}

fn stopped() -> RefreshFailed {
    RefreshFailed {
        message: "refresher is not running".to_string(),
    }
}

/// Start the refresher task.
///
/// The task stops once every [`RefresherHandle`] has been dropped.
pub fn spawn_refresher(
    feed: Arc<CachedFeed>,
    config: Arc<TrackerConfig>,
    dashboard: Arc<DashboardState>,
    period: Option<Duration>,
) -> (RefresherHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(8);
    let refresher = Refresher {
        feed,
        config,
        dashboard,
        period,
        rx,
    };
    let task = tokio::spawn(refresher.run());
    (RefresherHandle { tx }, task)
}

struct Refresher {
    feed: Arc<CachedFeed>,
    config: Arc<TrackerConfig>,
    dashboard: Arc<DashboardState>,
    period: Option<Duration>,
    rx: mpsc::Receiver<RefreshCommand>,
}

impl Refresher {
    async fn run(mut self) {
        self.dashboard.set_refresh_period(self.period).await;
        let mut deadline = self.next_deadline();

        loop {
            tokio::select! {
                _ = wait_until(deadline) => {
                    debug!("timed refresh");
                    // Failures are already on the dashboard.
                    let _ = self.refresh().await;
                    deadline = self.next_deadline();
                }
                command = self.rx.recv() => {
                    let Some(command) = command else {
                        debug!("all refresher handles dropped; stopping");
                        break;
                    };
                    match command {
                        RefreshCommand::Now { reply } => {
                            debug!("manual refresh");
                            let outcome = self.refresh().await;
                            let _ = reply.send(outcome);
                        }
                        RefreshCommand::SetPeriod(period) => {
                            info!(?period, "auto-refresh period changed");
                            self.period = period;
                            self.dashboard.set_refresh_period(period).await;
                        }
                    }
                    deadline = self.next_deadline();
                }
            }
        }
    }

    async fn refresh(&self) -> Result<(), RefreshFailed> {
        refresh_cycle(&self.feed, &self.config, &self.dashboard).await
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.period.map(|p| Instant::now() + p)
    }
}

/// Sleep until `deadline`, or forever when there is none.
async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
