//! Capability traits for everything outside the domain: the marker feed,
//! the platform's geolocation, and device-local storage.

use std::future::Future;

use freightmap_types::{FeedError, GeoPoint, LocationError, Marker, StoreError};

/// Source of marker snapshots
pub trait MarkerSource: Send + Sync {
    /// Fetch the current full marker list
    fn fetch_markers(&self) -> impl Future<Output = Result<Vec<Marker>, FeedError>> + Send;
}

/// Source of the viewer's location
pub trait LocationProvider: Send + Sync {
    /// Query the current location once
    fn locate(&self) -> impl Future<Output = Result<GeoPoint, LocationError>> + Send;
}

/// Device-local string storage (one JSON blob per key)
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}
