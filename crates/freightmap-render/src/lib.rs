//! Map presentation for freightmap
//!
//! Two interchangeable backends implement [`MapBackend`]: Yandex Maps
//! (primary) and OpenStreetMap through Leaflet (fallback). [`AdaptiveMap`]
//! owns both and switches between them without losing the marker set.

pub mod adaptive;
pub mod error;
mod html;
pub mod icons;
pub mod osm;
pub mod placemark;
pub mod yandex;

pub use adaptive::{AdaptiveMap, Banner};
pub use error::RenderError;
pub use osm::LeafletBackend;
pub use placemark::{Placemark, PlacemarkKind};
pub use yandex::YandexBackend;

use freightmap_types::{GeoPoint, MapProvider, Marker};

/// Initial map center (Moscow)
pub const DEFAULT_CENTER: GeoPoint = GeoPoint { lat: 55.7558, lng: 37.6173 };

/// Common contract of the map backends.
///
/// A backend holds no business logic: it turns markers into placemarks,
/// resolves clicks and hit tests, and exports itself as an HTML page.
pub trait MapBackend {
    fn provider(&self) -> MapProvider;

    /// Load the backend. Must succeed before anything is rendered.
    fn initialize(&mut self) -> Result<(), RenderError>;

    fn is_ready(&self) -> bool;

    /// Replace every placemark with the given markers (and the viewer, if known)
    fn render(&mut self, markers: &[Marker], user_location: Option<GeoPoint>) -> Result<(), RenderError>;

    fn placemarks(&self) -> &[Placemark];

    /// Draw `path` as a route line. An empty path removes it.
    fn set_route(&mut self, path: &[GeoPoint]);

    fn route(&self) -> &[GeoPoint];

    /// Invoke `on_click` with the full marker behind placemark `id`.
    /// Returns false when no such placemark is drawn.
    fn click(&self, id: &str, on_click: &mut dyn FnMut(&Marker)) -> bool {
        match self.placemarks().iter().find_map(|p| p.marker().filter(|m| m.id == id)) {
            Some(marker) => {
                on_click(marker);
                true
            }
            None => false,
        }
    }

    /// Nearest drawn marker within `tolerance_km` of `point`
    fn hit_test(&self, point: GeoPoint, tolerance_km: f64) -> Option<&Marker> {
        self.placemarks()
            .iter()
            .filter_map(|p| p.marker())
            .map(|m| (freightmap_domain::service::haversine_km(point, m.position()), m))
            .filter(|(distance, _)| *distance <= tolerance_km)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, m)| m)
    }

    /// Standalone HTML page showing the current placemarks and route.
    /// The view fits the route when one is drawn, otherwise the viewer or the markers.
    fn document(&self) -> Result<String, RenderError>;
}
