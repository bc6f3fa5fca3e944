//! Map backend errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Yandex Maps API key is not configured")]
    MissingApiKey,

    #[error("Map script failed to load: {0}")]
    ScriptLoad(String),

    #[error("Map backend is not initialized")]
    NotInitialized,

    #[error("Failed to encode placemarks: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<RenderError> for freightmap_types::Error {
    fn from(e: RenderError) -> Self {
        freightmap_types::Error::Map(e.to_string())
    }
}
