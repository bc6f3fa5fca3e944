//! Map marker types

use clap::ValueEnum;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Cargo statuses that take an offer off the map
pub const BOOKED_STATUSES: [&str; 3] = ["accepted", "in_transit", "delivered"];

/// Deserialize null as default value
fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::deserialize(deserializer).map(|opt| opt.unwrap_or_default())
}

/// Deserialize an optional field, treating values of the wrong shape as absent
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Marker ids arrive as strings or as database integers
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "marker id must be a string or number, got {}",
            other
        ))),
    }
}

/// WGS84 coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lng)
    }
}

/// What a marker stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    /// A cargo offer waiting for a carrier
    Cargo,
    /// A driver announcing availability
    Driver,
}

impl MarkerKind {
    pub fn label(&self) -> &'static str {
        match self {
            MarkerKind::Cargo => "Груз",
            MarkerKind::Driver => "Водитель",
        }
    }
}

impl std::fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkerKind::Cargo => write!(f, "cargo"),
            MarkerKind::Driver => write!(f, "driver"),
        }
    }
}

/// Packaging of a cargo offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CargoType {
    Box,
    Pallet,
    Oversized,
}

impl CargoType {
    pub fn label(&self) -> &'static str {
        match self {
            CargoType::Box => "Коробки",
            CargoType::Pallet => "Паллеты",
            CargoType::Oversized => "Негабарит",
        }
    }
}

/// Vehicle class of a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleCategory {
    Car,
    Truck,
    Semi,
}

impl VehicleCategory {
    pub fn label(&self) -> &'static str {
        match self {
            VehicleCategory::Car => "Легковой автомобиль",
            VehicleCategory::Truck => "Грузовой автомобиль",
            VehicleCategory::Semi => "Тягач с фурой",
        }
    }
}

/// Remaining room in a driver's vehicle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    #[default]
    Free,
    HasSpace,
    Full,
}

impl VehicleStatus {
    pub fn label(&self) -> &'static str {
        match self {
            VehicleStatus::Free => "Свободен",
            VehicleStatus::HasSpace => "Есть места",
            VehicleStatus::Full => "Загружен",
        }
    }
}

/// A point of interest on the live map.
///
/// Markers are snapshots: the client replaces its whole collection on
/// every successful poll and never patches one in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    #[serde(rename = "type")]
    pub kind: MarkerKind,

    pub lat: f64,
    pub lng: f64,

    #[serde(default, deserialize_with = "null_to_default")]
    pub name: String,

    /// Free text, also used for route matching
    #[serde(default, deserialize_with = "null_to_default")]
    pub details: String,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub cargo_type: Option<CargoType>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub vehicle_category: Option<VehicleCategory>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub vehicle_status: Option<VehicleStatus>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    /// Vehicle capacity (t)
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub capacity: Option<f64>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub free_space: Option<f64>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,

    /// Cargo weight (kg)
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,

    /// Cargo volume (m³)
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub destination_warehouse: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub client_address: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub client_rating: Option<f64>,

    /// "ready" or "scheduled"
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub ready_status: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub ready_time: Option<String>,
}

impl Marker {
    pub fn cargo(id: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self::bare(id.into(), MarkerKind::Cargo, lat, lng)
    }

    pub fn driver(id: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self::bare(id.into(), MarkerKind::Driver, lat, lng)
    }

    fn bare(id: String, kind: MarkerKind, lat: f64, lng: f64) -> Self {
        Self {
            id,
            kind,
            lat,
            lng,
            name: String::new(),
            details: String::new(),
            status: None,
            cargo_type: None,
            vehicle_category: None,
            vehicle_status: None,
            rating: None,
            capacity: None,
            free_space: None,
            quantity: None,
            weight: None,
            volume: None,
            destination_warehouse: None,
            client_address: None,
            client_rating: None,
            ready_status: None,
            ready_time: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_cargo_type(mut self, cargo_type: CargoType) -> Self {
        self.cargo_type = Some(cargo_type);
        self
    }

    pub fn with_vehicle(mut self, category: VehicleCategory, status: VehicleStatus) -> Self {
        self.vehicle_category = Some(category);
        self.vehicle_status = Some(status);
        self
    }

    pub fn with_ready_status(mut self, ready_status: impl Into<String>) -> Self {
        self.ready_status = Some(ready_status.into());
        self
    }

    /// Clear the attribute family that does not belong to this marker's kind
    pub fn normalized(mut self) -> Self {
        match self.kind {
            MarkerKind::Cargo => {
                self.vehicle_category = None;
                self.vehicle_status = None;
            }
            MarkerKind::Driver => {
                self.cargo_type = None;
            }
        }
        self
    }

    pub fn is_cargo(&self) -> bool {
        self.kind == MarkerKind::Cargo
    }

    pub fn is_driver(&self) -> bool {
        self.kind == MarkerKind::Driver
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }

    /// Cargo type, only meaningful for cargo markers
    pub fn cargo_type(&self) -> Option<CargoType> {
        if self.is_cargo() {
            self.cargo_type
        } else {
            None
        }
    }

    /// Vehicle category, only meaningful for driver markers
    pub fn vehicle_category(&self) -> Option<VehicleCategory> {
        if self.is_driver() {
            self.vehicle_category
        } else {
            None
        }
    }

    /// Vehicle status, only meaningful for driver markers
    pub fn vehicle_status(&self) -> Option<VehicleStatus> {
        if self.is_driver() {
            self.vehicle_status
        } else {
            None
        }
    }

    /// Cargo that has been accepted, is in transit or already delivered
    pub fn is_booked(&self) -> bool {
        self.is_cargo()
            && self
                .status
                .as_deref()
                .map(|s| BOOKED_STATUSES.contains(&s))
                .unwrap_or(false)
    }
}

/// Response body of the marker feed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarkerPayload {
    #[serde(default)]
    pub markers: Vec<Marker>,
}

/// Body of a position update sent back to the marker endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionReport {
    #[serde(rename = "type")]
    pub kind: MarkerKind,
    pub id: String,
    pub lat: f64,
    pub lng: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_cargo_marker() {
        let json = r#"{
            "id": "c-1",
            "type": "cargo",
            "lat": 55.75,
            "lng": 37.61,
            "name": "Паллеты",
            "details": "Москва - Казань, 500кг",
            "status": "Ожидает",
            "cargoType": "pallet",
            "weight": 500
        }"#;
        let marker: Marker = serde_json::from_str(json).unwrap();
        assert_eq!(marker.id, "c-1");
        assert_eq!(marker.kind, MarkerKind::Cargo);
        assert_eq!(marker.cargo_type(), Some(CargoType::Pallet));
        assert_eq!(marker.weight, Some(500.0));
        assert!(!marker.is_booked());
    }

    #[test]
    fn test_numeric_id_and_nulls() {
        let json = r#"{"id": 42, "type": "driver", "lat": 1.0, "lng": 2.0, "name": null, "details": null}"#;
        let marker: Marker = serde_json::from_str(json).unwrap();
        assert_eq!(marker.id, "42");
        assert_eq!(marker.name, "");
        assert_eq!(marker.details, "");
    }

    #[test]
    fn test_unknown_enum_values_are_absent() {
        let json = r#"{"id": "d", "type": "driver", "lat": 1.0, "lng": 2.0,
                       "vehicleCategory": "van", "vehicleStatus": "has_space", "rating": "n/a"}"#;
        let marker: Marker = serde_json::from_str(json).unwrap();
        assert_eq!(marker.vehicle_category, None);
        assert_eq!(marker.vehicle_status, Some(VehicleStatus::HasSpace));
        assert_eq!(marker.rating, None);
    }

    #[test]
    fn test_malformed_status_is_absent() {
        let json = r#"{"id": "c", "type": "cargo", "lat": 1.0, "lng": 2.0, "status": 3}"#;
        let marker: Marker = serde_json::from_str(json).unwrap();
        assert_eq!(marker.status, None);
        assert!(!marker.is_booked());

        let json = r#"{"id": "c", "type": "cargo", "lat": 1.0, "lng": 2.0, "status": {"code": "delivered"}}"#;
        let marker: Marker = serde_json::from_str(json).unwrap();
        assert_eq!(marker.status, None);
    }

    #[test]
    fn test_normalized_clears_foreign_family() {
        let cargo = Marker::cargo("c", 0.0, 0.0)
            .with_cargo_type(CargoType::Box)
            .with_vehicle(VehicleCategory::Truck, VehicleStatus::Full)
            .normalized();
        assert_eq!(cargo.cargo_type, Some(CargoType::Box));
        assert!(cargo.vehicle_category.is_none());
        assert!(cargo.vehicle_status.is_none());

        let mut driver = Marker::driver("d", 0.0, 0.0).with_vehicle(VehicleCategory::Semi, VehicleStatus::Free);
        driver.cargo_type = Some(CargoType::Pallet);
        assert_eq!(driver.cargo_type(), None);
        let driver = driver.normalized();
        assert!(driver.cargo_type.is_none());
        assert_eq!(driver.vehicle_category(), Some(VehicleCategory::Semi));
    }

    #[test]
    fn test_booked_statuses() {
        for status in BOOKED_STATUSES {
            assert!(Marker::cargo("c", 0.0, 0.0).with_status(status).is_booked());
        }
        assert!(!Marker::cargo("c", 0.0, 0.0).with_status("waiting").is_booked());
        assert!(!Marker::driver("d", 0.0, 0.0).with_status("delivered").is_booked());
    }

    #[test]
    fn test_position_report_wire_format() {
        let report = PositionReport {
            kind: MarkerKind::Driver,
            id: "d-7".to_string(),
            lat: 55.0,
            lng: 37.0,
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["type"], "driver");
        assert_eq!(value["id"], "d-7");
    }
}
