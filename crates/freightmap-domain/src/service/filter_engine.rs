//! Marker filtering
//!
//! Stages run in a fixed order and each one narrows the output of the
//! previous one. A stage whose criterion is unset is skipped:
//! 1. role (client sees drivers, carrier sees cargo)
//! 2. role sub-filter (driver status for clients, readiness for carriers)
//! 3. cargo type
//! 4. vehicle type
//! 5. route substring (either endpoint matches)

use freightmap_types::{FilterState, Marker, MarkerKind, RouteSearch, UserType};

/// Reduce the raw marker list to the subset visible under `filters`.
///
/// The filter is stable: survivors keep their relative input order.
pub fn apply_filters(markers: &[Marker], filters: &FilterState, route_search: &RouteSearch) -> Vec<Marker> {
    let route = RouteMatcher::new(route_search);
    markers
        .iter()
        .filter(|m| role_stage(m, filters.user_type))
        .filter(|m| role_sub_stage(m, filters))
        .filter(|m| cargo_type_stage(m, filters))
        .filter(|m| vehicle_type_stage(m, filters))
        .filter(|m| route.matches(m))
        .cloned()
        .collect()
}

fn role_stage(marker: &Marker, user_type: UserType) -> bool {
    match user_type {
        UserType::All => true,
        UserType::Client => marker.kind == MarkerKind::Driver,
        UserType::Carrier => marker.kind == MarkerKind::Cargo,
    }
}

fn role_sub_stage(marker: &Marker, filters: &FilterState) -> bool {
    match filters.user_type {
        UserType::Client => match filters.vehicle_status {
            Some(status) => marker.vehicle_status() == Some(status),
            None => true,
        },
        UserType::Carrier => match filters.cargo_readiness {
            Some(readiness) => readiness.matches(marker.ready_status.as_deref()),
            None => true,
        },
        UserType::All => true,
    }
}

fn cargo_type_stage(marker: &Marker, filters: &FilterState) -> bool {
    match filters.cargo_type {
        Some(cargo_type) => marker.cargo_type() == Some(cargo_type),
        None => true,
    }
}

fn vehicle_type_stage(marker: &Marker, filters: &FilterState) -> bool {
    match filters.vehicle_type {
        Some(category) => marker.vehicle_category() == Some(category),
        None => true,
    }
}

/// Lowercased route endpoints, or `None` when the route stage is off
struct RouteMatcher {
    endpoints: Option<(String, String)>,
}

impl RouteMatcher {
    fn new(route_search: &RouteSearch) -> Self {
        let endpoints = route_search
            .is_active()
            .then(|| (route_search.from.to_lowercase(), route_search.to.to_lowercase()));
        Self { endpoints }
    }

    /// Broad match: `details` containing either endpoint passes
    fn matches(&self, marker: &Marker) -> bool {
        match &self.endpoints {
            Some((from, to)) => {
                let details = marker.details.to_lowercase();
                details.contains(from.as_str()) || details.contains(to.as_str())
            }
            None => true,
        }
    }
}
