//! Map filter state

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::marker::{CargoType, VehicleCategory, VehicleStatus};

/// Who the viewer is looking as.
///
/// The role is inverted on purpose: a client looks for drivers, a carrier
/// looks for cargo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    All,
    Client,
    Carrier,
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserType::All => write!(f, "all"),
            UserType::Client => write!(f, "client"),
            UserType::Carrier => write!(f, "carrier"),
        }
    }
}

/// Cargo readiness as announced by the shipper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CargoReadiness {
    /// Ready for pickup now
    Ready,
    /// Will be ready later
    Scheduled,
}

impl CargoReadiness {
    pub fn as_str(&self) -> &'static str {
        match self {
            CargoReadiness::Ready => "ready",
            CargoReadiness::Scheduled => "scheduled",
        }
    }

    pub fn matches(&self, ready_status: Option<&str>) -> bool {
        ready_status == Some(self.as_str())
    }
}

/// Filter criteria selected in the map sidebar.
///
/// `None` on an optional criterion means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    #[serde(default)]
    pub user_type: UserType,

    #[serde(default)]
    pub cargo_type: Option<CargoType>,

    #[serde(default)]
    pub vehicle_type: Option<VehicleCategory>,

    /// Only applies while looking as a client
    #[serde(default)]
    pub vehicle_status: Option<VehicleStatus>,

    /// Only applies while looking as a carrier
    #[serde(default)]
    pub cargo_readiness: Option<CargoReadiness>,
}

impl FilterState {
    pub fn for_user(user_type: UserType) -> Self {
        Self {
            user_type,
            ..Default::default()
        }
    }

    pub fn with_cargo_type(mut self, cargo_type: CargoType) -> Self {
        self.cargo_type = Some(cargo_type);
        self
    }

    pub fn with_vehicle_type(mut self, vehicle_type: VehicleCategory) -> Self {
        self.vehicle_type = Some(vehicle_type);
        self
    }
}

/// Free-text route search (Откуда / Куда)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSearch {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}

impl RouteSearch {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// The route stage only runs when both endpoints are filled in
    pub fn is_active(&self) -> bool {
        !self.from.is_empty() && !self.to.is_empty()
    }
}
