//! Domain services

pub mod filter_engine;
pub mod geo;
pub mod marker_stats;
pub mod proximity;
pub mod route_history;
pub mod saved_routes;

pub use filter_engine::apply_filters;
pub use geo::{haversine_km, EARTH_RADIUS_KM};
pub use marker_stats::MarkerStats;
pub use proximity::{ProximityNotification, ProximityNotifier};
pub use route_history::RouteHistory;
pub use saved_routes::SavedRoutes;
