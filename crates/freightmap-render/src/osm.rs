//! OpenStreetMap backend (Leaflet over CARTO tiles)

use freightmap_types::{GeoPoint, MapProvider, Marker};

use crate::error::RenderError;
use crate::html::{page, script_json};
use crate::icons::{Icon, ROUTE_COLOR};
use crate::placemark::{build_placemarks, Placemark};
use crate::{MapBackend, DEFAULT_CENTER};

const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const TILE_URL: &str = "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png";
const ATTRIBUTION: &str = "&copy; OpenStreetMap contributors &copy; CARTO";
const ZOOM: u8 = 10;
const USER_ZOOM: u8 = 14;
const FIT_MAX_ZOOM: u8 = 13;

/// Needs no key; initialization always succeeds
pub struct LeafletBackend {
    center: GeoPoint,
    ready: bool,
    placemarks: Vec<Placemark>,
    route: Vec<GeoPoint>,
}

impl Default for LeafletBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl LeafletBackend {
    pub fn new() -> Self {
        Self {
            center: DEFAULT_CENTER,
            ready: false,
            placemarks: Vec::new(),
            route: Vec::new(),
        }
    }

    pub fn with_center(mut self, center: GeoPoint) -> Self {
        self.center = center;
        self
    }
}

/// White glyph on a disc of the icon color
fn frame(icon: &Icon) -> String {
    format!(
        r#"<div style="background:{};width:36px;height:36px;border-radius:50%;display:flex;align-items:center;justify-content:center;border:3px solid white;box-shadow:0 4px 12px rgba(0,0,0,0.3)">{}</div>"#,
        icon.color,
        icon.svg("white")
    )
}

/// How the exported page positions itself
fn viewport(route: &[GeoPoint], placemarks: &[Placemark]) -> String {
    if !route.is_empty() {
        return "map.fitBounds(route.getBounds(), { padding: [50, 50] });".to_string();
    }
    if let Some(user) = placemarks.iter().find(|p| p.marker().is_none()) {
        return format!("map.setView([{}, {}], {});", user.lat, user.lng, USER_ZOOM);
    }
    if placemarks.is_empty() {
        return String::new();
    }
    format!(
        "map.fitBounds(placemarks.map(function (p) {{ return [p.lat, p.lng]; }}), {{ padding: [50, 50], maxZoom: {} }});",
        FIT_MAX_ZOOM
    )
}

impl MapBackend for LeafletBackend {
    fn provider(&self) -> MapProvider {
        MapProvider::OpenStreetMap
    }

    fn initialize(&mut self) -> Result<(), RenderError> {
        self.ready = true;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn render(&mut self, markers: &[Marker], user_location: Option<GeoPoint>) -> Result<(), RenderError> {
        if !self.ready {
            return Err(RenderError::NotInitialized);
        }
        self.placemarks = build_placemarks(markers, user_location, frame);
        Ok(())
    }

    fn placemarks(&self) -> &[Placemark] {
        &self.placemarks
    }

    fn set_route(&mut self, path: &[GeoPoint]) {
        self.route = path.to_vec();
    }

    fn route(&self) -> &[GeoPoint] {
        &self.route
    }

    fn document(&self) -> Result<String, RenderError> {
        if !self.ready {
            return Err(RenderError::NotInitialized);
        }
        let head = format!(
            r#"<link rel="stylesheet" href="{}"/>
<script src="{}"></script>"#,
            LEAFLET_CSS, LEAFLET_JS
        );
        let path: Vec<[f64; 2]> = self.route.iter().map(|p| [p.lat, p.lng]).collect();
        let script = format!(
            r#"const placemarks = {placemarks};
const path = {path};
const map = L.map("map").setView([{lat}, {lng}], {zoom});
L.tileLayer("{tiles}", {{ attribution: "{attribution}", maxZoom: 19, subdomains: "abcd" }}).addTo(map);
placemarks.forEach(function (p) {{
  const icon = L.divIcon({{ className: "custom-marker", html: p.icon_html, iconSize: [36, 36], iconAnchor: [18, 18] }});
  L.marker([p.lat, p.lng], {{ icon: icon, title: p.hint }}).bindPopup(p.balloon).addTo(map);
}});
const route = path.length > 0
  ? L.polyline(path, {{ color: "{route_color}", weight: 5, opacity: 0.7, smoothFactor: 1 }}).addTo(map)
  : null;
{viewport}"#,
            placemarks = script_json(&self.placemarks)?,
            path = script_json(&path)?,
            route_color = ROUTE_COLOR,
            viewport = viewport(&self.route, &self.placemarks),
            lat = self.center.lat,
            lng = self.center.lng,
            zoom = ZOOM,
            tiles = TILE_URL,
            attribution = ATTRIBUTION
        );
        Ok(page("Карта грузов (OpenStreetMap)", &head, &script))
    }
}
