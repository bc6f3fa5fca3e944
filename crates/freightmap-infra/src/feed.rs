//! Marker feed over HTTP
//!
//! `GET <endpoint>` returns `{"markers": [...]}`; `POST <endpoint>` with a
//! [`PositionReport`] body moves one marker.

use std::time::Duration;

use freightmap_domain::repository::MarkerSource;
use freightmap_types::{FeedError, Marker, PositionReport};

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpMarkerFeed {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpMarkerFeed {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("freightmap/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::Network(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send the current coordinates of a marker back to the server
    pub async fn report_position(&self, report: &PositionReport) -> Result<(), FeedError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(report)
            .send()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }
        log::info!("Reported position of {} {} at {}, {}", report.kind, report.id, report.lat, report.lng);
        Ok(())
    }
}

impl MarkerSource for HttpMarkerFeed {
    async fn fetch_markers(&self) -> Result<Vec<Marker>, FeedError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| FeedError::Network(e.to_string()))?;
        parse_marker_payload(&body)
    }
}

/// Parse a feed body.
///
/// The body must be a JSON object; a missing `markers` field means no
/// markers. Individual markers that do not parse (no id, bad coordinates,
/// unknown type) are skipped with a warning instead of failing the whole
/// snapshot.
pub fn parse_marker_payload(body: &str) -> Result<Vec<Marker>, FeedError> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| FeedError::Malformed(e.to_string()))?;

    let object = value
        .as_object()
        .ok_or_else(|| FeedError::Malformed("expected a JSON object".to_string()))?;

    let entries = match object.get("markers") {
        None | Some(serde_json::Value::Null) => return Ok(Vec::new()),
        Some(serde_json::Value::Array(entries)) => entries,
        Some(_) => return Err(FeedError::Malformed("'markers' is not an array".to_string())),
    };

    let mut markers = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match serde_json::from_value::<Marker>(entry.clone()) {
            Ok(marker) => markers.push(marker.normalized()),
            Err(e) => log::warn!("Skipping marker #{}: {}", index, e),
        }
    }
    Ok(markers)
}
