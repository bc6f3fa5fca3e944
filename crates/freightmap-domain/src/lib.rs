//! Domain layer: marker filtering, proximity notifications, saved routes,
//! and the capability traits the outer layers implement.

pub mod repository;
pub mod service;
