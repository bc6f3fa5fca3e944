//! Location providers for hosts without platform geolocation

use std::time::Duration;

use freightmap_domain::repository::LocationProvider;
use freightmap_types::{GeoPoint, LocationError};

/// Default IP geolocation service
pub const DEFAULT_IP_GEOLOCATION_URL: &str = "https://ipapi.co/json/";

/// A location set in the configuration, or none at all
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocationProvider {
    location: Option<GeoPoint>,
}

impl FixedLocationProvider {
    pub fn new(location: Option<GeoPoint>) -> Self {
        Self { location }
    }
}

impl LocationProvider for FixedLocationProvider {
    async fn locate(&self) -> Result<GeoPoint, LocationError> {
        self.location.ok_or(LocationError::Unavailable)
    }
}

/// Approximate location from the public IP address
pub struct IpLocationProvider {
    client: reqwest::Client,
    url: String,
}

impl IpLocationProvider {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, LocationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LocationError::Lookup(e.to_string()))?;
        Ok(Self { client, url: url.into() })
    }
}

impl LocationProvider for IpLocationProvider {
    async fn locate(&self) -> Result<GeoPoint, LocationError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| LocationError::Lookup(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LocationError::Lookup(format!("HTTP {}", status.as_u16())));
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LocationError::Lookup(e.to_string()))?;
        let point = parse_coordinates(&value)?;
        log::info!("Location found via {}: {}", self.url, point);
        Ok(point)
    }
}

/// Accepts `latitude`/`longitude` (ipapi.co) or `lat`/`lon` (ip-api.com)
fn parse_coordinates(value: &serde_json::Value) -> Result<GeoPoint, LocationError> {
    let field = |names: [&str; 2]| names.iter().find_map(|name| value.get(*name).and_then(|v| v.as_f64()));
    match (field(["latitude", "lat"]), field(["longitude", "lon"])) {
        (Some(lat), Some(lng)) => Ok(GeoPoint::new(lat, lng)),
        _ => Err(LocationError::Lookup("response has no coordinates".to_string())),
    }
}

/// Location source picked from the configuration
pub enum ConfiguredLocation {
    Fixed(FixedLocationProvider),
    Ip(IpLocationProvider),
}

impl LocationProvider for ConfiguredLocation {
    async fn locate(&self) -> Result<GeoPoint, LocationError> {
        match self {
            ConfiguredLocation::Fixed(provider) => provider.locate().await,
            ConfiguredLocation::Ip(provider) => provider.locate().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_coordinates() {
        let ipapi = json!({"ip": "1.2.3.4", "latitude": 55.75, "longitude": 37.62});
        assert_eq!(parse_coordinates(&ipapi).unwrap(), GeoPoint::new(55.75, 37.62));

        let ip_api = json!({"status": "success", "lat": 59.93, "lon": 30.33});
        assert_eq!(parse_coordinates(&ip_api).unwrap(), GeoPoint::new(59.93, 30.33));

        let error = json!({"error": true, "reason": "RateLimited"});
        assert!(matches!(parse_coordinates(&error), Err(LocationError::Lookup(_))));
    }

    #[tokio::test]
    async fn test_fixed_provider() {
        let none = FixedLocationProvider::default();
        assert_eq!(none.locate().await, Err(LocationError::Unavailable));

        let home = ConfiguredLocation::Fixed(FixedLocationProvider::new(Some(GeoPoint::new(1.0, 2.0))));
        assert_eq!(home.locate().await, Ok(GeoPoint::new(1.0, 2.0)));
    }
}
