//! Proxy error taxonomy and its HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors that end an image request
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Missing path, wrong namespace, or unsafe filename
    #[error("Invalid path")]
    InvalidPath,

    /// Resolved local path leaves the upload directory
    #[error("path escapes upload directory")]
    PathEscape,

    /// Origin answered with a non-success status
    #[error("upstream responded with {0}")]
    Upstream(StatusCode),

    /// Origin unreachable or the exchange failed mid-flight
    #[error("upstream request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// No provider could supply the image
    #[error("image not found")]
    NotFound,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ProxyError {
    /// HTTP status this error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidPath | ProxyError::PathEscape => StatusCode::BAD_REQUEST,
            ProxyError::Upstream(status) => *status,
            ProxyError::Network(_) => StatusCode::BAD_GATEWAY,
            ProxyError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ProxyError::InvalidPath => (
                status,
                Json(ErrorResponse {
                    error: self.to_string(),
                }),
            )
                .into_response(),
            _ => status.into_response(),
        }
    }
}
