//! Configuration management for freightmap
//!
//! Config stored at: ~/.config/freightmap/config.json

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use freightmap_infra::location::DEFAULT_IP_GEOLOCATION_URL;
use freightmap_types::{ConfigError, GeoPoint, MapProvider, OutputFormat, Result};

use crate::session::SessionSettings;

/// Environment variable that overrides the configured Yandex key
pub const YANDEX_API_KEY_ENV: &str = "FREIGHTMAP_YANDEX_API_KEY";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Marker feed endpoint (GET snapshot, POST position)
    #[serde(default = "default_markers_endpoint")]
    pub markers_endpoint: String,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Radius for nearby cargo notifications
    #[serde(default = "default_proximity_radius_km")]
    pub proximity_radius_km: f64,

    #[serde(default = "default_notification_ttl_ms")]
    pub notification_ttl_ms: u64,

    /// Preferred map backend (yandex, osm)
    #[serde(default)]
    pub map_provider: MapProvider,

    #[serde(default)]
    pub yandex_api_key: Option<String>,

    #[serde(default = "default_yandex_lang")]
    pub yandex_lang: String,

    /// Local storage directory override
    #[serde(default)]
    pub store_dir: Option<PathBuf>,

    /// Default output format (json, table)
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Fixed viewer location, used when IP geolocation is off
    #[serde(default)]
    pub home_location: Option<GeoPoint>,

    #[serde(default)]
    pub ip_geolocation: bool,

    #[serde(default = "default_ip_geolocation_url")]
    pub ip_geolocation_url: String,
}

fn default_markers_endpoint() -> String {
    "http://localhost:8000/map-data".to_string()
}

fn default_poll_interval_ms() -> u64 {
    5000
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_proximity_radius_km() -> f64 {
    50.0
}

fn default_notification_ttl_ms() -> u64 {
    5000
}

fn default_yandex_lang() -> String {
    "ru_RU".to_string()
}

fn default_ip_geolocation_url() -> String {
    DEFAULT_IP_GEOLOCATION_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            markers_endpoint: default_markers_endpoint(),
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            proximity_radius_km: default_proximity_radius_km(),
            notification_ttl_ms: default_notification_ttl_ms(),
            map_provider: MapProvider::default(),
            yandex_api_key: None,
            yandex_lang: default_yandex_lang(),
            store_dir: None,
            output_format: OutputFormat::default(),
            home_location: None,
            ip_geolocation: false,
            ip_geolocation_url: default_ip_geolocation_url(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NotFound)?.join("freightmap");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Get the local storage directory path
    pub fn store_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.store_dir {
            return Ok(dir.clone());
        }

        let store_dir = dirs::data_dir().ok_or(ConfigError::NotFound)?.join("freightmap");
        Ok(store_dir)
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config =
                serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Reject values the polling session cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ParseError("poll_interval_ms must be positive".to_string()).into());
        }
        if self.proximity_radius_km.is_nan() || self.proximity_radius_km <= 0.0 {
            return Err(ConfigError::ParseError(format!(
                "proximity_radius_km must be positive, got {}",
                self.proximity_radius_km
            ))
            .into());
        }
        Ok(())
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Yandex key, the environment taking precedence over the file
    pub fn yandex_api_key(&self) -> Option<String> {
        resolve_api_key(std::env::var(YANDEX_API_KEY_ENV).ok(), self.yandex_api_key.clone())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            poll_interval: self.poll_interval(),
            notification_ttl: self.notification_ttl(),
        }
    }
}

fn resolve_api_key(env: Option<String>, configured: Option<String>) -> Option<String> {
    env.into_iter()
        .chain(configured)
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Freightmap Configuration")?;
        writeln!(f, "========================")?;
        writeln!(f)?;
        writeln!(f, "Markers endpoint:   {}", self.markers_endpoint)?;
        writeln!(f, "Poll interval:      {} ms", self.poll_interval_ms)?;
        writeln!(f, "Request timeout:    {} ms", self.request_timeout_ms)?;
        writeln!(f, "Proximity radius:   {} km", self.proximity_radius_km)?;
        writeln!(f, "Notification TTL:   {} ms", self.notification_ttl_ms)?;
        writeln!(f, "Map provider:       {}", self.map_provider)?;
        writeln!(
            f,
            "Yandex API key:     {}",
            if self.yandex_api_key().is_some() { "(set)" } else { "(not set)" }
        )?;
        writeln!(f, "Yandex language:    {}", self.yandex_lang)?;
        writeln!(
            f,
            "Store dir:          {}",
            self.store_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "(error)".to_string())
        )?;
        writeln!(f, "Output format:      {}", self.output_format)?;
        writeln!(
            f,
            "Home location:      {}",
            self.home_location
                .map(|p| p.to_string())
                .unwrap_or_else(|| "(none)".to_string())
        )?;
        writeln!(f, "IP geolocation:     {}", self.ip_geolocation)?;
        if self.ip_geolocation {
            writeln!(f, "Geolocation URL:    {}", self.ip_geolocation_url)?;
        }

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:        {}", path.display())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use freightmap_types::Error;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.notification_ttl(), Duration::from_secs(5));
        assert_eq!(config.proximity_radius_km, 50.0);
        assert_eq!(config.map_provider, MapProvider::Yandex);
        assert_eq!(config.yandex_lang, "ru_RU");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"map_provider": "osm", "proximity_radius_km": 20}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.map_provider, MapProvider::OpenStreetMap);
        assert_eq!(config.proximity_radius_km, 20.0);
        assert_eq!(config.poll_interval_ms, 5000);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.markers_endpoint, default_markers_endpoint());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = Config::default();
        config.home_location = Some(GeoPoint::new(55.0, 37.0));
        config.output_format = OutputFormat::Json;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.home_location, Some(GeoPoint::new(55.0, 37.0)));
        assert_eq!(loaded.output_format, OutputFormat::Json);
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"poll_interval_ms": 0, "map_provider": "osm"}"#).unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::ParseError(_))));
        assert!(err.to_string().contains("poll_interval_ms"));
    }

    #[test]
    fn test_non_positive_radius_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        for radius in ["0", "-5"] {
            std::fs::write(&path, format!(r#"{{"proximity_radius_km": {}}}"#, radius)).unwrap();
            assert!(Config::load_from(&path).is_err());
        }

        let config = Config {
            proximity_radius_km: f64::NAN,
            ..Config::default()
        };
        assert!(config.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_api_key_resolution() {
        assert_eq!(resolve_api_key(Some("env".into()), Some("file".into())), Some("env".into()));
        assert_eq!(resolve_api_key(Some("  ".into()), Some("file".into())), Some("file".into()));
        assert_eq!(resolve_api_key(None, Some("".into())), None);
        assert_eq!(resolve_api_key(None, None), None);
    }
}
