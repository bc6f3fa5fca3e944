//! Primary/fallback map switching

use serde::Serialize;

use freightmap_types::{GeoPoint, MapProvider, Marker};

use crate::error::RenderError;
use crate::osm::LeafletBackend;
use crate::placemark::Placemark;
use crate::yandex::YandexBackend;
use crate::MapBackend;

/// Informational notice shown after the primary backend failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub title: String,
    pub message: String,
    pub reason: String,
    pub link: String,
}

impl Banner {
    fn fallback(reason: &RenderError) -> Self {
        Self {
            title: "Используется OpenStreetMap".to_string(),
            message: "Яндекс.Карты временно недоступны. Для их активации добавьте API ключ в секреты проекта."
                .to_string(),
            reason: reason.to_string(),
            link: "https://developer.tech.yandex.ru/".to_string(),
        }
    }
}

/// Yandex first, OpenStreetMap when Yandex cannot be used.
///
/// The last rendered markers are retained so that a backend switch
/// redraws the same state. Once Yandex has failed the switch is final.
pub struct AdaptiveMap {
    yandex: YandexBackend,
    osm: LeafletBackend,
    active: MapProvider,
    primary_failure: Option<String>,
    banner: Option<Banner>,
    markers: Vec<Marker>,
    user_location: Option<GeoPoint>,
}

impl AdaptiveMap {
    pub fn new(yandex: YandexBackend, osm: LeafletBackend) -> Self {
        Self {
            yandex,
            osm,
            active: MapProvider::Yandex,
            primary_failure: None,
            banner: None,
            markers: Vec::new(),
            user_location: None,
        }
    }

    /// Initialize the preferred backend, falling back when Yandex fails
    pub fn start(&mut self, preferred: MapProvider) -> Result<(), RenderError> {
        self.activate(preferred)
    }

    pub fn active_provider(&self) -> MapProvider {
        self.active
    }

    pub fn primary_failed(&self) -> bool {
        self.primary_failure.is_some()
    }

    /// Manual switching is offered only while Yandex is usable
    pub fn can_toggle(&self) -> bool {
        !self.primary_failed()
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    /// Switch to the other backend. Returns `None` when switching is disabled.
    pub fn toggle(&mut self) -> Option<Result<MapProvider, RenderError>> {
        if !self.can_toggle() {
            return None;
        }
        let target = self.active.other();
        Some(self.activate(target).map(|_| self.active))
    }

    /// Report a runtime failure of the Yandex backend (e.g. the script
    /// could not be loaded) and move to OpenStreetMap.
    pub fn fail_primary(&mut self, error: RenderError) -> Result<(), RenderError> {
        log::warn!("Yandex Maps unavailable, switching to OpenStreetMap: {}", error);
        self.banner = Some(Banner::fallback(&error));
        self.primary_failure = Some(error.to_string());
        self.activate(MapProvider::OpenStreetMap)
    }

    pub fn render(&mut self, markers: &[Marker], user_location: Option<GeoPoint>) -> Result<(), RenderError> {
        self.markers = markers.to_vec();
        self.user_location = user_location;
        self.backend_mut().render(markers, user_location)
    }

    pub fn placemarks(&self) -> &[Placemark] {
        self.backend().placemarks()
    }

    /// Show `path` on both backends so a switch keeps it
    pub fn set_route(&mut self, path: &[GeoPoint]) {
        self.yandex.set_route(path);
        self.osm.set_route(path);
    }

    pub fn route(&self) -> &[GeoPoint] {
        self.backend().route()
    }

    pub fn click(&self, id: &str, on_click: &mut dyn FnMut(&Marker)) -> bool {
        self.backend().click(id, on_click)
    }

    pub fn hit_test(&self, point: GeoPoint, tolerance_km: f64) -> Option<&Marker> {
        self.backend().hit_test(point, tolerance_km)
    }

    pub fn document(&self) -> Result<String, RenderError> {
        self.backend().document()
    }

    pub fn backend(&self) -> &dyn MapBackend {
        match self.active {
            MapProvider::Yandex => &self.yandex,
            MapProvider::OpenStreetMap => &self.osm,
        }
    }

    fn backend_mut(&mut self) -> &mut dyn MapBackend {
        match self.active {
            MapProvider::Yandex => &mut self.yandex,
            MapProvider::OpenStreetMap => &mut self.osm,
        }
    }

    fn activate(&mut self, provider: MapProvider) -> Result<(), RenderError> {
        if provider == MapProvider::Yandex && !self.yandex.is_ready() {
            if let Err(e) = self.yandex.initialize() {
                return self.fail_primary(e);
            }
        }
        if provider == MapProvider::OpenStreetMap && !self.osm.is_ready() {
            self.osm.initialize()?;
        }

        self.active = provider;
        log::debug!("Map backend: {}", provider);
        let markers = std::mem::take(&mut self.markers);
        let user_location = self.user_location;
        let result = self.backend_mut().render(&markers, user_location);
        self.markers = markers;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed() -> AdaptiveMap {
        AdaptiveMap::new(YandexBackend::new(Some("key".to_string()), "ru_RU"), LeafletBackend::new())
    }

    fn keyless() -> AdaptiveMap {
        AdaptiveMap::new(YandexBackend::new(None, "ru_RU"), LeafletBackend::new())
    }

    fn drawn_ids(map: &AdaptiveMap) -> Vec<String> {
        map.placemarks()
            .iter()
            .filter_map(|p| p.marker())
            .map(|m| m.id.clone())
            .collect()
    }

    #[test]
    fn test_missing_key_falls_back_with_banner() {
        let mut map = keyless();
        map.start(MapProvider::Yandex).unwrap();
        assert_eq!(map.active_provider(), MapProvider::OpenStreetMap);
        assert!(map.primary_failed());
        assert!(!map.can_toggle());
        assert!(map.toggle().is_none());
        let banner = map.banner().unwrap();
        assert_eq!(banner.title, "Используется OpenStreetMap");
        assert!(banner.reason.contains("API key"));
    }

    #[test]
    fn test_runtime_failure_keeps_markers() {
        let mut map = keyed();
        map.start(MapProvider::Yandex).unwrap();
        assert_eq!(map.active_provider(), MapProvider::Yandex);
        assert!(map.banner().is_none());

        let markers = vec![Marker::cargo("c1", 55.0, 37.0), Marker::driver("d1", 55.1, 37.1)];
        map.render(&markers, None).unwrap();

        map.fail_primary(RenderError::ScriptLoad("timeout".to_string())).unwrap();
        assert_eq!(map.active_provider(), MapProvider::OpenStreetMap);
        assert_eq!(drawn_ids(&map), vec!["c1", "d1"]);
        assert!(map.banner().is_some());
    }

    #[test]
    fn test_switch_redraws_for_current_viewer() {
        let mut map = keyed();
        map.start(MapProvider::Yandex).unwrap();
        let here = GeoPoint::new(55.0, 37.0);
        map.render(&[Marker::cargo("c1", 55.0, 37.0)], Some(here)).unwrap();

        map.fail_primary(RenderError::ScriptLoad("blocked".to_string())).unwrap();
        let user = map.placemarks().iter().find(|p| p.marker().is_none()).unwrap();
        assert_eq!(user.position(), here);
    }

    #[test]
    fn test_route_survives_backend_switch() {
        let mut map = keyed();
        map.start(MapProvider::Yandex).unwrap();
        let path = [GeoPoint::new(55.75, 37.61), GeoPoint::new(55.79, 49.12)];
        map.set_route(&path);
        assert_eq!(map.route(), &path[..]);

        map.toggle().unwrap().unwrap();
        assert_eq!(map.active_provider(), MapProvider::OpenStreetMap);
        assert_eq!(map.route(), &path[..]);
        assert!(map.document().unwrap().contains("L.polyline"));

        map.set_route(&[]);
        assert!(map.route().is_empty());
    }

    #[test]
    fn test_manual_toggle_round_trip() {
        let mut map = keyed();
        map.start(MapProvider::Yandex).unwrap();
        map.render(&[Marker::cargo("c1", 55.0, 37.0)], Some(GeoPoint::new(55.0, 37.0))).unwrap();

        assert_eq!(map.toggle().unwrap().unwrap(), MapProvider::OpenStreetMap);
        assert_eq!(map.placemarks().len(), 2);
        assert_eq!(map.toggle().unwrap().unwrap(), MapProvider::Yandex);
        assert_eq!(drawn_ids(&map), vec!["c1"]);
        assert!(map.banner().is_none());
    }

    #[test]
    fn test_toggle_to_keyless_yandex_fails_over() {
        let mut map = keyless();
        map.start(MapProvider::OpenStreetMap).unwrap();
        assert!(map.can_toggle());

        assert_eq!(map.toggle().unwrap().unwrap(), MapProvider::OpenStreetMap);
        assert!(map.primary_failed());
        assert!(map.toggle().is_none());
    }
}
