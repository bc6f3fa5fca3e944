//! Adapters opened from the configuration

use std::path::PathBuf;

use freightmap_domain::service::{RouteHistory, SavedRoutes};
use freightmap_infra::{ConfiguredLocation, FileKeyValueStore, FixedLocationProvider, HttpMarkerFeed, IpLocationProvider};
use freightmap_types::Result;

use crate::config::Config;

/// Open the local key-value store
pub fn open_kv_store(config: &Config) -> Result<FileKeyValueStore> {
    let store_dir = config.store_dir()?;
    open_kv_store_at(store_dir)
}

/// Open the local key-value store at a custom directory
pub fn open_kv_store_at(store_dir: PathBuf) -> Result<FileKeyValueStore> {
    FileKeyValueStore::open(store_dir).map_err(Into::into)
}

pub fn open_saved_routes(config: &Config) -> Result<SavedRoutes<FileKeyValueStore>> {
    Ok(SavedRoutes::new(open_kv_store(config)?))
}

pub fn open_route_history(config: &Config) -> Result<RouteHistory<FileKeyValueStore>> {
    Ok(RouteHistory::new(open_kv_store(config)?))
}

/// HTTP client for the configured marker endpoint
pub fn open_marker_feed(config: &Config) -> Result<HttpMarkerFeed> {
    HttpMarkerFeed::new(config.markers_endpoint.clone(), config.request_timeout()).map_err(Into::into)
}

/// IP geolocation when enabled, otherwise the fixed home location (if any)
pub fn open_location(config: &Config) -> Result<ConfiguredLocation> {
    if config.ip_geolocation {
        let provider = IpLocationProvider::new(config.ip_geolocation_url.clone(), config.request_timeout())?;
        return Ok(ConfiguredLocation::Ip(provider));
    }
    Ok(ConfiguredLocation::Fixed(FixedLocationProvider::new(config.home_location)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_routes_share_one_store_file() {
        let dir = tempdir().unwrap();
        let config = Config {
            store_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        };

        let saved = open_saved_routes(&config).unwrap();
        saved.save("Москва", "Казань", None).unwrap();
        let history = open_route_history(&config).unwrap();
        history.record("Москва", "Казань", None, None).unwrap();

        // Each opener reads the file afresh
        assert_eq!(open_saved_routes(&config).unwrap().list().unwrap().len(), 1);
        assert!(dir.path().join("local_storage.json").exists());
    }

    #[test]
    fn test_open_location_prefers_fixed_by_default() {
        let config = Config {
            home_location: Some(freightmap_types::GeoPoint::new(1.0, 2.0)),
            ..Config::default()
        };
        assert!(matches!(open_location(&config).unwrap(), ConfiguredLocation::Fixed(_)));
    }
}
