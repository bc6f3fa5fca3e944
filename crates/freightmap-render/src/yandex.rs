//! Yandex Maps JS API backend

use freightmap_types::{GeoPoint, MapProvider, Marker, MarkerKind};

use crate::error::RenderError;
use crate::html::{escape, page, script_json};
use crate::icons::{Icon, ROUTE_COLOR};
use crate::placemark::{build_placemarks, Placemark};
use crate::{MapBackend, DEFAULT_CENTER};

const SCRIPT_URL: &str = "https://api-maps.yandex.ru/2.1/";
const ZOOM: u8 = 13;
const USER_ZOOM: u8 = 14;

pub struct YandexBackend {
    api_key: Option<String>,
    lang: String,
    center: GeoPoint,
    ready: bool,
    placemarks: Vec<Placemark>,
    route: Vec<GeoPoint>,
}

impl YandexBackend {
    pub fn new(api_key: Option<String>, lang: impl Into<String>) -> Self {
        Self {
            api_key,
            lang: lang.into(),
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

    /// URL of the JS API loader, `None` without an API key
    pub fn script_url(&self) -> Option<String> {
        let key = self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())?;
        Some(format!("{}?apikey={}&lang={}", SCRIPT_URL, key, self.lang))
    }
}

/// Rounded tile for cargo, bare outline for vehicles
fn frame(icon: &Icon) -> String {
    match icon.kind {
        MarkerKind::Cargo => format!(
            r#"<div style="width:44px;height:44px;background:{};border-radius:12px;display:flex;align-items:center;justify-content:center;box-shadow:0 4px 12px rgba(0,0,0,0.15)">{}</div>"#,
            icon.color,
            icon.svg("white")
        ),
        MarkerKind::Driver => format!(
            r#"<div style="width:50px;height:50px;display:flex;align-items:center;justify-content:center;filter:drop-shadow(0 4px 12px rgba(0,0,0,0.25))">{}</div>"#,
            icon.svg(icon.color)
        ),
    }
}

fn viewport(route: &[GeoPoint], placemarks: &[Placemark]) -> String {
    if !route.is_empty() {
        return r#"map.setBounds(route.geometry.getBounds(), { checkZoomRange: true, zoomMargin: 50 });"#.to_string();
    }
    if let Some(user) = placemarks.iter().find(|p| p.marker().is_none()) {
        return format!("map.setCenter([{}, {}], {});", user.lat, user.lng, USER_ZOOM);
    }
    if placemarks.is_empty() {
        return String::new();
    }
    r#"map.setBounds(map.geoObjects.getBounds(), { checkZoomRange: true, zoomMargin: 50 });"#.to_string()
}

impl MapBackend for YandexBackend {
    fn provider(&self) -> MapProvider {
        MapProvider::Yandex
    }

    fn initialize(&mut self) -> Result<(), RenderError> {
        if self.script_url().is_none() {
            return Err(RenderError::MissingApiKey);
        }
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
        let url = self.script_url().ok_or(RenderError::MissingApiKey)?;
        if !self.ready {
            return Err(RenderError::NotInitialized);
        }
        let head = format!(r#"<script src="{}"></script>"#, escape(&url));
        let path: Vec<[f64; 2]> = self.route.iter().map(|p| [p.lat, p.lng]).collect();
        let script = format!(
            r#"const placemarks = {placemarks};
const path = {path};
ymaps.ready(function () {{
  const map = new ymaps.Map("map", {{ center: [{lat}, {lng}], zoom: {zoom}, controls: ["zoomControl"] }});
  map.behaviors.disable("scrollZoom");
  placemarks.forEach(function (p) {{
    const layout = ymaps.templateLayoutFactory.createClass(p.icon_html);
    map.geoObjects.add(new ymaps.Placemark([p.lat, p.lng],
      {{ hintContent: p.hint, balloonContent: p.balloon }},
      {{ iconLayout: "default#imageWithContent", iconImageHref: "", iconImageSize: [44, 44], iconImageOffset: [-22, -22], iconContentLayout: layout }}));
  }});
  const route = path.length > 0
    ? new ymaps.Polyline(path, {{}}, {{ strokeColor: "{route_color}", strokeWidth: 5, strokeOpacity: 0.7 }})
    : null;
  if (route) map.geoObjects.add(route);
  {viewport}
}});"#,
            placemarks = script_json(&self.placemarks)?,
            path = script_json(&path)?,
            route_color = ROUTE_COLOR,
            viewport = viewport(&self.route, &self.placemarks),
            lat = self.center.lat,
            lng = self.center.lng,
            zoom = ZOOM
        );
        Ok(page("Карта грузов", &head, &script))
    }
}
