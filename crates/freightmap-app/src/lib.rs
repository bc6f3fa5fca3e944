//! Application layer - config, live map orchestration, polling session

pub mod config;
pub mod live_map;
pub mod repository;
pub mod session;

pub use config::Config;
pub use live_map::{LiveMap, MapView, MarkerClick, SnapshotOutcome};
pub use session::{LiveMapHandle, LiveMapSession, SessionEvent, SessionSettings};
