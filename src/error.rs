// src/error.rs
//! Error types shared across the service.
//!
//! Two failure families exist: request validation problems, reported as 400
//! before any chain interaction is attempted, and chain-side failures
//! (estimation, submission, read calls), reported as 500 carrying the
//! underlying node message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Convenience alias used across the crate
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body or query string failed schema validation.
    /// The message lists every missing or malformed field.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The node could not produce a gas estimate or gas price for a call.
    #[error("gas estimation failed: {0}")]
    Estimation(String),

    /// The node rejected a submitted transaction, or local signing failed.
    #[error("transaction submission failed: {0}")]
    Submission(String),

    /// ABI encoding/decoding, a read-only call, or signature recovery failed.
    #[error("contract interaction failed: {0}")]
    Contract(String),
}

impl ApiError {
    /// Builds a `Validation` error from collected field diagnostics.
    pub fn validation(problems: Vec<String>) -> Self {
        ApiError::Validation(problems.join(", "))
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Estimation(_) | ApiError::Submission(_) | ApiError::Contract(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{self}");
        } else {
            log::warn!("{self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err = ApiError::validation(vec![
            "educationAddress is required".into(),
            "credentialDate must be a string".into(),
        ]);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("educationAddress is required"));
        assert!(err.to_string().contains("credentialDate must be a string"));
    }

    #[test]
    fn chain_errors_map_to_internal_server_error() {
        for err in [
            ApiError::Estimation("execution reverted".into()),
            ApiError::Submission("insufficient funds".into()),
            ApiError::Contract("bad output".into()),
        ] {
            assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
