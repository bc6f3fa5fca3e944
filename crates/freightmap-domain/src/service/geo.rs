//! Great-circle distance

use std::f64::consts::PI;

use freightmap_types::GeoPoint;

/// Mean Earth radius (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points in kilometers.
///
/// Degrees are converted as `deg * PI / 180` and squares are taken as
/// `sin * sin` so results match the web client to the last bit.
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let d_lat = (to.lat - from.lat) * PI / 180.0;
    let d_lng = (to.lng - from.lng) * PI / 180.0;
    let a = (d_lat / 2.0).sin() * (d_lat / 2.0).sin()
        + (from.lat * PI / 180.0).cos()
            * (to.lat * PI / 180.0).cos()
            * (d_lng / 2.0).sin()
            * (d_lng / 2.0).sin();
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOSCOW: GeoPoint = GeoPoint { lat: 55.7558, lng: 37.6173 };
    const SAINT_PETERSBURG: GeoPoint = GeoPoint { lat: 59.9343, lng: 30.3351 };

    #[test]
    fn test_moscow_to_saint_petersburg() {
        let d = haversine_km(MOSCOW, SAINT_PETERSBURG);
        assert!((d - 634.5).abs() < 2.0, "got {}", d);
    }

    #[test]
    fn test_zero_distance() {
        assert_eq!(haversine_km(MOSCOW, MOSCOW), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let there = haversine_km(MOSCOW, SAINT_PETERSBURG);
        let back = haversine_km(SAINT_PETERSBURG, MOSCOW);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let d = haversine_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        assert!((d - 111.19).abs() < 0.01, "got {}", d);
    }
}
