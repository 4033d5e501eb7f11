//! HTTP route handlers.

use askama::Template;
use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use futures::future::join_all;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::flatten::merged_shapes_by_route;
use crate::mbta::FeedRequest;

use super::dto::*;
use super::layers::MapLayer;
use super::state::AppState;
use super::templates::DashboardTemplate;

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/health", get(health))
        .route("/api/alerts", get(alerts))
        .route("/api/departures", get(departures))
        .route("/api/arrivals/near-term", get(near_term_arrivals))
        .route("/api/arrivals/future", get(future_arrivals))
        .route("/api/vehicles", get(vehicles))
        .route("/api/shapes/:layer", get(layer_shapes))
        .route("/refresh", post(refresh))
        .route("/settings/refresh-interval", post(set_refresh_interval))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// The dashboard page.
async fn dashboard_page(State(state): State<AppState>) -> Result<Response, AppError> {
    let snapshot = state.dashboard.snapshot().await;
    let period = state.dashboard.refresh_period().await;

    let html = DashboardTemplate::from_snapshot(&snapshot, &state.config, period)
        .render()
        .map_err(|e| AppError::Internal {
            message: format!("Template error: {}", e),
        })?;

    Ok(Html(html).into_response())
}

async fn alerts(State(state): State<AppState>) -> Json<AlertsResponse> {
    let snapshot = state.dashboard.snapshot().await;
    let clock = state.config.clock();

    Json(AlertsResponse {
        alerts: snapshot
            .alerts
            .iter()
            .map(|a| AlertRow::from_record(a, &clock))
            .collect(),
        error: snapshot.error.clone(),
    })
}

async fn departures(State(state): State<AppState>) -> Json<DeparturesResponse> {
    let snapshot = state.dashboard.snapshot().await;
    let clock = state.config.clock();

    Json(DeparturesResponse {
        departures: snapshot
            .departures
            .iter()
            .map(|d| DepartureRow::from_record(d, &clock))
            .collect(),
        error: snapshot.error.clone(),
    })
}

async fn near_term_arrivals(State(state): State<AppState>) -> Json<ArrivalsResponse> {
    let snapshot = state.dashboard.snapshot().await;
    let clock = state.config.clock();

    Json(ArrivalsResponse {
        arrivals: snapshot
            .near_term
            .iter()
            .map(|a| ArrivalRow::from_record(a, &clock))
            .collect(),
        error: snapshot.error.clone(),
    })
}

async fn future_arrivals(State(state): State<AppState>) -> Json<ArrivalsResponse> {
    let snapshot = state.dashboard.snapshot().await;
    let clock = state.config.clock();

    Json(ArrivalsResponse {
        arrivals: snapshot
            .future
            .iter()
            .map(|a| ArrivalRow::from_record(a, &clock))
            .collect(),
        error: snapshot.error.clone(),
    })
}

async fn vehicles(State(state): State<AppState>) -> Json<VehiclesResponse> {
    let snapshot = state.dashboard.snapshot().await;

    Json(VehiclesResponse {
        vehicles: snapshot.vehicles.clone(),
        error: snapshot.error.clone(),
    })
}

/// Geometry for one map layer.
///
/// By default every segment of every route in the layer, from the shape
/// cache. With `?merged=true`, one representative geometry per route,
/// fetched fresh.
async fn layer_shapes(
    State(state): State<AppState>,
    Path(layer): Path<String>,
    Query(query): Query<ShapesQuery>,
) -> Result<Json<ShapesResponse>, AppError> {
    let layer: MapLayer = layer.parse().map_err(|e: super::layers::UnknownLayer| {
        AppError::NotFound {
            message: e.to_string(),
        }
    })?;
    let route_ids = layer.route_ids();

    let shapes = if query.merged {
        let fetches = route_ids.iter().map(|&route_id| {
            let feed = &state.feed;
            async move {
                let response = feed.fetch(&FeedRequest::shapes(route_id)).await;
                if let Err(e) = &response {
                    warn!(route = route_id, error = %e, "failed to fetch shapes");
                }
                (route_id, response)
            }
        });
        let responses = join_all(fetches).await;
        merged_shapes_by_route(responses.iter().map(|(id, r)| (*id, r)))
            .into_values()
            .collect()
    } else {
        state.feed.layer_shapes(route_ids).await
    };

    Ok(Json(ShapesResponse {
        layer: layer.to_string(),
        color: layer.color().to_string(),
        shapes,
    }))
}

/// Check if request accepts HTML.
fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// Refresh now.
///
/// Browsers are sent back to the dashboard, which shows any failure in its
/// banner. JSON clients get the outcome directly.
async fn refresh(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let outcome = state.refresher.refresh_now().await;

    if accepts_html(&headers) {
        return Redirect::to("/").into_response();
    }

    let snapshot = state.dashboard.snapshot().await;
    let clock = state.config.clock();
    let status = if outcome.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };

    let body = RefreshResponse {
        refreshed: outcome.is_ok(),
        last_refresh: snapshot.last_refresh.map(|t| clock.format_stamp(t)),
        error: outcome.err().map(|e| e.message),
    };
    (status, Json(body)).into_response()
}

/// Change the auto-refresh interval.
async fn set_refresh_interval(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<IntervalForm>,
) -> Result<Response, AppError> {
    if form.minutes.is_nan() || form.minutes < 0.0 {
        return Err(AppError::BadRequest {
            message: format!("Invalid refresh interval: {}", form.minutes),
        });
    }

    let period = state.config.refresh_period(form.minutes);
    state
        .refresher
        .set_period(period)
        .await
        .map_err(|e| AppError::Internal { message: e.message })?;

    if accepts_html(&headers) {
        return Ok(Redirect::to("/").into_response());
    }

    Ok(Json(IntervalResponse {
        period_secs: period.map(|p| p.as_secs_f64()),
    })
    .into_response())
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, "{message}");
        } else {
            warn!(%status, "{message}");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
