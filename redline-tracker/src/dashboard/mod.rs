//! Live dashboard for the tracked line.
//!
//! Serves an HTML page and JSON endpoints over the latest [`Snapshot`],
//! which a background refresher rebuilds on a timer or on demand.

mod dto;
mod layers;
mod refresh;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use layers::{MapLayer, UnknownLayer};
pub use refresh::{RefreshFailed, RefresherHandle, refresh_cycle, spawn_refresher};
pub use routes::{AppError, create_router};
pub use state::{AppState, DashboardState, Snapshot};
