//! Core types for the freightmap live cargo map

mod error;
mod filter;
mod marker;
mod route;

pub use error::*;
pub use filter::*;
pub use marker::*;
pub use route::*;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Output format for results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Tile map provider used to present markers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapProvider {
    /// Yandex Maps JS API (primary)
    #[default]
    Yandex,
    /// OpenStreetMap tiles through Leaflet (fallback)
    #[value(name = "osm")]
    #[serde(rename = "osm")]
    OpenStreetMap,
}

impl MapProvider {
    /// The provider to switch to when this one is unavailable
    pub fn other(self) -> Self {
        match self {
            MapProvider::Yandex => MapProvider::OpenStreetMap,
            MapProvider::OpenStreetMap => MapProvider::Yandex,
        }
    }
}

impl std::fmt::Display for MapProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapProvider::Yandex => write!(f, "yandex"),
            MapProvider::OpenStreetMap => write!(f, "osm"),
        }
    }
}
