//! Payload flatteners.
//!
//! Each function takes the outcome of one fetch and produces flat domain
//! records. A failed fetch yields an empty result; reporting the failure is
//! the caller's job. Malformed fields degrade the affected record (a null
//! time, a dropped vehicle) and never the whole payload.

mod alerts;
mod index;
mod next_stop;
mod predictions;
mod shapes;
mod vehicles;

pub use alerts::flatten_alerts;
pub use index::ResourceIndex;
pub use next_stop::next_stop_by_vehicle;
pub use predictions::{arrivals_within, flatten_arrivals, flatten_departures, vehicle_stop_map};
pub use shapes::{decode_shape, merged_route_shape, merged_shapes_by_route, route_segments};
pub use vehicles::{enrich_vehicles, flatten_enriched_vehicles, flatten_vehicle_positions};
