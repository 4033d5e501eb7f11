//! Askama templates for the dashboard page.

use askama::Template;

use super::dto::{AlertRow, ArrivalRow, DepartureRow};
use super::layers::MapLayer;
use super::state::Snapshot;
use crate::config::TrackerConfig;
use crate::domain::{EnrichedVehicle, PLACEHOLDER};

/// The dashboard page.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub route_id: String,
    pub origin_stop: String,
    pub error_message: String,
    pub last_refresh: String,
    pub refresh_minutes: String,
    pub alerts: Vec<AlertRow>,
    pub departures: Vec<DepartureRow>,
    pub near_term: Vec<ArrivalRow>,
    pub future: Vec<ArrivalRow>,
    pub vehicles: Vec<VehicleView>,
    pub layers: Vec<LayerView>,
}

impl DashboardTemplate {
    pub fn from_snapshot(
        snapshot: &Snapshot,
        config: &TrackerConfig,
        refresh_period: Option<std::time::Duration>,
    ) -> Self {
        let clock = config.clock();

        Self {
            route_id: config.route_id.clone(),
            origin_stop: config.origin_stop.clone(),
            error_message: snapshot.error.clone().unwrap_or_default(),
            last_refresh: snapshot
                .last_refresh
                .map(|t| clock.format_stamp(t))
                .unwrap_or_else(|| "never".to_string()),
            refresh_minutes: refresh_period
                .map(|p| format_minutes(p.as_secs_f64() / 60.0))
                .unwrap_or_else(|| "0".to_string()),
            alerts: snapshot
                .alerts
                .iter()
                .map(|a| AlertRow::from_record(a, &clock))
                .collect(),
            departures: snapshot
                .departures
                .iter()
                .map(|d| DepartureRow::from_record(d, &clock))
                .collect(),
            near_term: snapshot
                .near_term
                .iter()
                .map(|a| ArrivalRow::from_record(a, &clock))
                .collect(),
            future: snapshot
                .future
                .iter()
                .map(|a| ArrivalRow::from_record(a, &clock))
                .collect(),
            vehicles: snapshot.vehicles.iter().map(VehicleView::from_vehicle).collect(),
            layers: MapLayer::ALL.iter().map(|&l| LayerView::from_layer(l)).collect(),
        }
    }
}

fn format_minutes(minutes: f64) -> String {
    if minutes.fract() == 0.0 {
        format!("{minutes:.0}")
    } else {
        format!("{minutes:.1}")
    }
}

/// Vehicle view model for templates.
#[derive(Debug, Clone)]
pub struct VehicleView {
    pub vehicle_id: String,
    pub latitude: String,
    pub longitude: String,
    pub bearing: String,
    pub destination: String,
    pub direction: String,
    pub next_stop_name: String,
    pub next_stop_time: String,
    pub minutes_behind: String,
}

impl VehicleView {
    pub fn from_vehicle(vehicle: &EnrichedVehicle) -> Self {
        let position = &vehicle.position;
        Self {
            vehicle_id: position.vehicle_id.clone(),
            latitude: format!("{:.5}", position.latitude),
            longitude: format!("{:.5}", position.longitude),
            bearing: position
                .bearing
                .map(|b| format!("{b:.0}"))
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            destination: vehicle.destination.clone(),
            direction: vehicle.direction.clone(),
            next_stop_name: vehicle.next_stop_name.clone(),
            next_stop_time: vehicle.next_stop_time_expected.clone(),
            minutes_behind: vehicle
                .minutes_behind
                .map(|m| format!("{m:+.1}"))
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
        }
    }
}

/// Map layer toggle.
#[derive(Debug, Clone)]
pub struct LayerView {
    pub id: String,
    pub name: String,
    pub color: String,
    /// Drawn when the page loads.
    pub checked: bool,
}

impl LayerView {
    pub fn from_layer(layer: MapLayer) -> Self {
        Self {
            id: layer.name().to_lowercase(),
            name: layer.to_string(),
            color: layer.color().to_string(),
            checked: layer == MapLayer::Red,
        }
    }
}
