//! Backend-neutral drawn objects

use serde::Serialize;

use freightmap_types::{GeoPoint, Marker};

use crate::html::escape;
use crate::icons::{icon_for, is_displayable, Icon, USER_LOCATION_COLOR};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlacemarkKind {
    Marker { marker: Box<Marker> },
    UserLocation,
}

/// One object drawn on the map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placemark {
    #[serde(flatten)]
    pub kind: PlacemarkKind,
    pub lat: f64,
    pub lng: f64,
    /// Tooltip text
    pub hint: String,
    /// Popup HTML
    pub balloon: String,
    /// Icon HTML
    pub icon_html: String,
    pub color: &'static str,
}

impl Placemark {
    pub fn marker(&self) -> Option<&Marker> {
        match &self.kind {
            PlacemarkKind::Marker { marker } => Some(marker),
            PlacemarkKind::UserLocation => None,
        }
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }

    pub fn for_user(location: GeoPoint) -> Self {
        Self {
            kind: PlacemarkKind::UserLocation,
            lat: location.lat,
            lng: location.lng,
            hint: "Ваше местоположение".to_string(),
            balloon: "<strong>Вы здесь</strong>".to_string(),
            icon_html: format!(
                r#"<div style="width:40px;height:40px;background:{};border:3px solid white;border-radius:50%;display:flex;align-items:center;justify-content:center"><svg width="20" height="20" viewBox="0 0 24 24" fill="white"><circle cx="12" cy="12" r="4"/></svg></div>"#,
                USER_LOCATION_COLOR
            ),
            color: USER_LOCATION_COLOR,
        }
    }

    fn for_marker(marker: &Marker, frame: fn(&Icon) -> String) -> Self {
        let icon = icon_for(marker);
        Self {
            kind: PlacemarkKind::Marker {
                marker: Box::new(marker.clone()),
            },
            lat: marker.lat,
            lng: marker.lng,
            hint: marker.name.clone(),
            balloon: balloon(marker),
            icon_html: frame(&icon),
            color: icon.color,
        }
    }
}

/// Placemarks for every displayable marker, then the viewer's own placemark.
/// `frame` wraps an icon in the backend's own container markup.
pub fn build_placemarks(
    markers: &[Marker],
    user_location: Option<GeoPoint>,
    frame: fn(&Icon) -> String,
) -> Vec<Placemark> {
    let mut placemarks: Vec<Placemark> = markers
        .iter()
        .filter(|m| is_displayable(m))
        .map(|m| Placemark::for_marker(m, frame))
        .collect();
    if let Some(location) = user_location {
        placemarks.push(Placemark::for_user(location));
    }
    placemarks
}

fn balloon(marker: &Marker) -> String {
    let mut html = format!(
        "<strong>{}</strong><br/>{}",
        escape(marker.kind.label()),
        escape(&marker.name)
    );
    if !marker.details.is_empty() {
        html.push_str(&format!("<br/>{}", escape(&marker.details)));
    }
    if let Some(cargo_type) = marker.cargo_type() {
        html.push_str(&format!("<br/>Тип груза: {}", cargo_type.label()));
    }
    if let Some(category) = marker.vehicle_category() {
        html.push_str(&format!("<br/>Транспорт: {}", category.label()));
    }
    if let Some(status) = marker.vehicle_status() {
        html.push_str(&format!("<br/>{}", status.label()));
    }
    html
}
