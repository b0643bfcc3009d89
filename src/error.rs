//! Error types for the icon search service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Errors raised while loading the bundled manifest.
///
/// Individually malformed records never produce one of these; they are
/// skipped during the load. Only a document that cannot be used at all does.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Failed to read manifest {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Manifest root is not an object")]
    NotAnObject,

    #[error("Manifest section missing or not a list: {0}")]
    MissingSection(&'static str),

    #[error("Manifest contains no valid entries")]
    Empty,
}

/// Failures talking to the remote symbol search API.
///
/// These never leave the remote searcher: at the trait boundary every
/// variant collapses into an empty result set.
#[derive(Debug, thiserror::Error)]
pub enum RemoteSearchFailure {
    #[error("Remote search request failed: {0}")]
    Transport(String),

    #[error("Remote search returned status {0}")]
    Status(u16),

    #[error("Remote search returned a non-JSON body")]
    NotJson,

    #[error("Remote search payload could not be decoded: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for RemoteSearchFailure {
    fn from(err: reqwest::Error) -> Self {
        RemoteSearchFailure::Transport(err.to_string())
    }
}

/// Request-level errors returned by the HTTP API.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::UnknownCategory(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
