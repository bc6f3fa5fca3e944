//! Counters shown above the map

use serde::Serialize;

use freightmap_types::{Marker, VehicleStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MarkerStats {
    /// Cargo offers still waiting for a carrier
    pub cargo_waiting: usize,
    /// Drivers with an empty vehicle
    pub drivers_free: usize,
    pub drivers_total: usize,
}

impl MarkerStats {
    pub fn summarize(markers: &[Marker]) -> Self {
        markers.iter().fold(Self::default(), |mut stats, marker| {
            if marker.is_cargo() && !marker.is_booked() {
                stats.cargo_waiting += 1;
            }
            if marker.is_driver() {
                stats.drivers_total += 1;
                if marker.vehicle_status().unwrap_or_default() == VehicleStatus::Free {
                    stats.drivers_free += 1;
                }
            }
            stats
        })
    }
}
