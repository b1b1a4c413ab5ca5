//! Error types for the HTTP ingest service, mapped to their HTTP status
//! codes via `IntoResponse`.

use crate::storage::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use metrics_core::wire::ValidationError;
use tracing::{error, warn};

/// Errors a handler can return, mapped to the status taxonomy in :
/// validation (400), not found (404), admission denied (403), and
/// persistence (500/503).
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("unsupported content type '{content_type}', expected application/json")]
    UnsupportedContentType { content_type: String },

    #[error("unknown metric '{id}' of type '{kind}'")]
    NotFound { id: String, kind: String },

    #[error("request denied: {reason}")]
    AdmissionDenied { reason: String },

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation(_) | Self::MalformedBody(_) | Self::UnsupportedContentType { .. } => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            Self::NotFound { .. } => (StatusCode::NOT_FOUND, self.to_string()),
            Self::AdmissionDenied { reason } => {
                warn!(reason = %reason, "request denied admission");
                (StatusCode::FORBIDDEN, self.to_string())
            }
            Self::Storage(err) => {
                error!(error = %err, "storage failure handling ingest request");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        (status, message).into_response()
    }
}

/// Errors that abort server startup before the process can serve traffic.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("failed to bind to address {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("server failed: {message}")]
    ServerFailed { message: String },

    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("storage initialization failed: {0}")]
    StorageInit(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}
