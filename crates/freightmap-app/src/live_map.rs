//! Live map orchestration
//!
//! [`LiveMap`] is a synchronous state machine. It owns the marker snapshot,
//! the filter and route state, the proximity notifier, the selection and
//! the map backend. All async work (polling, geolocation, expiry timers)
//! happens in [`crate::session`], which feeds results back in here.

use serde::Serialize;

use freightmap_domain::service::{apply_filters, MarkerStats, ProximityNotification, ProximityNotifier};
use freightmap_render::{AdaptiveMap, Banner, LeafletBackend, RenderError, YandexBackend};
use freightmap_types::{FeedError, FilterState, GeoPoint, LocationError, MapProvider, Marker, Result, RouteSearch};

use crate::config::Config;

/// What happened to a fetch result
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotOutcome {
    /// The snapshot replaced the markers; carries the notifications it admitted
    Applied(Vec<ProximityNotification>),
    /// An older request finished after a newer one was applied
    Stale,
    /// The fetch failed; the previous snapshot is kept
    Retained,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarkerClick {
    Selected(Marker),
    /// Anonymous viewers cannot open marker details
    SignInRequired,
    NotFound,
}

/// Everything a presenter needs to draw one frame
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub markers_total: usize,
    pub filtered: Vec<Marker>,
    pub stats: MarkerStats,
    pub notifications: Vec<ProximityNotification>,
    pub filters: FilterState,
    pub route_search: RouteSearch,
    /// Route line drawn on the map, empty when none
    pub route_path: Vec<GeoPoint>,
    pub user_location: Option<GeoPoint>,
    pub provider: MapProvider,
    pub can_toggle_provider: bool,
    pub banner: Option<Banner>,
    pub selected: Option<Marker>,
    pub sign_in_required: bool,
    pub last_error: Option<String>,
    pub snapshot_seq: Option<u64>,
}

pub struct LiveMap {
    markers: Vec<Marker>,
    filtered: Vec<Marker>,
    filters: FilterState,
    route_search: RouteSearch,
    user_location: Option<GeoPoint>,
    notifier: ProximityNotifier,
    map: AdaptiveMap,
    selected: Option<Marker>,
    sign_in_required: bool,
    public: bool,
    last_applied_seq: Option<u64>,
    last_error: Option<String>,
}

impl LiveMap {
    /// `map` must already be started
    pub fn new(map: AdaptiveMap, notifier: ProximityNotifier) -> Self {
        Self {
            markers: Vec::new(),
            filtered: Vec::new(),
            filters: FilterState::default(),
            route_search: RouteSearch::default(),
            user_location: None,
            notifier,
            map,
            selected: None,
            sign_in_required: false,
            public: false,
            last_applied_seq: None,
            last_error: None,
        }
    }

    /// Build the map backends from `config` and start the preferred one
    pub fn from_config(config: &Config) -> Result<Self> {
        let yandex = YandexBackend::new(config.yandex_api_key(), config.yandex_lang.clone());
        let mut map = AdaptiveMap::new(yandex, LeafletBackend::new());
        map.start(config.map_provider)?;
        Ok(Self::new(map, ProximityNotifier::new(config.proximity_radius_km)))
    }

    /// Anonymous mode: clicks ask for sign-in instead of opening details
    pub fn with_public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    pub fn with_filters(mut self, filters: FilterState) -> Self {
        self.filters = filters;
        self.refresh();
        self
    }

    pub fn with_route_search(mut self, route_search: RouteSearch) -> Self {
        self.route_search = route_search;
        self.refresh();
        self
    }

    /// Feed the result of fetch number `seq`.
    ///
    /// Sequence numbers grow with every request issued; a successful result
    /// older than the last applied one is dropped.
    pub fn apply_snapshot(&mut self, seq: u64, result: std::result::Result<Vec<Marker>, FeedError>) -> SnapshotOutcome {
        let markers = match result {
            Ok(markers) => markers,
            Err(e) => {
                log::warn!("Marker fetch #{} failed, keeping previous snapshot: {}", seq, e);
                self.last_error = Some(e.to_string());
                return SnapshotOutcome::Retained;
            }
        };

        if self.last_applied_seq.is_some_and(|last| seq <= last) {
            log::debug!("Dropping stale snapshot #{}", seq);
            return SnapshotOutcome::Stale;
        }

        log::debug!("Snapshot #{} applied: {} markers", seq, markers.len());
        self.last_applied_seq = Some(seq);
        self.last_error = None;
        self.markers = markers;
        self.refresh();
        SnapshotOutcome::Applied(self.notifier.observe(&self.markers, self.user_location))
    }

    pub fn set_filters(&mut self, filters: FilterState) {
        self.filters = filters;
        self.refresh();
    }

    pub fn set_route_search(&mut self, route_search: RouteSearch) {
        self.route_search = route_search;
        self.refresh();
    }

    /// Draw a planned route; an empty path removes it
    pub fn set_route_path(&mut self, path: Vec<GeoPoint>) {
        self.map.set_route(&path);
    }

    /// Record a new viewer location and re-check the current markers for
    /// nearby cargo. Returns the notifications admitted.
    pub fn set_user_location(&mut self, location: GeoPoint) -> Vec<ProximityNotification> {
        self.user_location = Some(location);
        self.redraw();
        self.notifier.observe(&self.markers, self.user_location)
    }

    /// The platform could not locate the viewer; proximity stays off until it does
    pub fn location_unavailable(&mut self, error: &LocationError) {
        log::info!("Location unavailable, nearby cargo notifications disabled: {}", error);
    }

    pub fn click_marker(&mut self, id: &str) -> MarkerClick {
        let mut clicked = None;
        if !self.map.click(id, &mut |marker| clicked = Some(marker.clone())) {
            return MarkerClick::NotFound;
        }
        let Some(marker) = clicked else {
            return MarkerClick::NotFound;
        };

        if self.public {
            self.sign_in_required = true;
            return MarkerClick::SignInRequired;
        }
        self.selected = Some(marker.clone());
        MarkerClick::Selected(marker)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.sign_in_required = false;
    }

    pub fn dismiss_notification(&mut self, id: &str) -> bool {
        self.notifier.dismiss(id)
    }

    pub fn expire_notification(&mut self, id: &str, ticket: u64) -> bool {
        self.notifier.expire(id, ticket)
    }

    /// The primary map backend failed at runtime
    pub fn backend_failed(&mut self, reason: impl Into<String>) {
        if let Err(e) = self.map.fail_primary(RenderError::ScriptLoad(reason.into())) {
            log::error!("Fallback map backend failed: {}", e);
        }
    }

    /// Manual backend switch; `None` once the primary has failed
    pub fn toggle_backend(&mut self) -> Option<MapProvider> {
        match self.map.toggle()? {
            Ok(provider) => Some(provider),
            Err(e) => {
                log::error!("Map backend switch failed: {}", e);
                Some(self.map.active_provider())
            }
        }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn filtered(&self) -> &[Marker] {
        &self.filtered
    }

    pub fn user_location(&self) -> Option<GeoPoint> {
        self.user_location
    }

    pub fn notifier(&self) -> &ProximityNotifier {
        &self.notifier
    }

    pub fn map(&self) -> &AdaptiveMap {
        &self.map
    }

    pub fn view(&self) -> MapView {
        MapView {
            markers_total: self.markers.len(),
            filtered: self.filtered.clone(),
            stats: MarkerStats::summarize(&self.filtered),
            notifications: self.notifier.active().into_iter().cloned().collect(),
            filters: self.filters.clone(),
            route_search: self.route_search.clone(),
            route_path: self.map.route().to_vec(),
            user_location: self.user_location,
            provider: self.map.active_provider(),
            can_toggle_provider: self.map.can_toggle(),
            banner: self.map.banner().cloned(),
            selected: self.selected.clone(),
            sign_in_required: self.sign_in_required,
            last_error: self.last_error.clone(),
            snapshot_seq: self.last_applied_seq,
        }
    }

    fn refresh(&mut self) {
        self.filtered = apply_filters(&self.markers, &self.filters, &self.route_search);
        self.redraw();
    }

    fn redraw(&mut self) {
        if let Err(e) = self.map.render(&self.filtered, self.user_location) {
            log::warn!("Map render failed: {}", e);
        }
    }
}
