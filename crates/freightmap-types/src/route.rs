//! Locally persisted routes

use serde::{Deserialize, Serialize};

/// A named route the user saved for quick searching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedRoute {
    pub id: String,
    pub from: String,
    pub to: String,
    pub name: String,
}

/// A past route search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteHistoryItem {
    pub id: String,
    pub from: String,
    pub to: String,
    /// Unix epoch milliseconds
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cargo_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
}
