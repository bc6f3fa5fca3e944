//! Infrastructure adapters for freightmap

pub mod feed;
pub mod location;
pub mod storage;

pub use feed::{parse_marker_payload, HttpMarkerFeed};
pub use location::{ConfiguredLocation, FixedLocationProvider, IpLocationProvider};
pub use storage::{FileKeyValueStore, MemoryKeyValueStore};
