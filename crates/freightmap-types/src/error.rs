//! Error types for freightmap

use thiserror::Error;

/// Marker feed errors. Every variant is transient: the caller keeps its
/// previous snapshot and waits for the next scheduled tick.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeedError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    #[error("Malformed marker payload: {0}")]
    Malformed(String),
}

/// Geolocation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    #[error("Location is not available on this host")]
    Unavailable,

    #[error("Location permission denied")]
    Denied,

    #[error("Location lookup failed: {0}")]
    Lookup(String),
}

/// Local key-value storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store data corrupted: {0}")]
    Corrupted(String),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Marker feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Map error: {0}")]
    Map(String),

    #[error("Live map session failed: {0}")]
    Session(String),

    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;
