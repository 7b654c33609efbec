//! Error types for the VibeCurator API
//!
//! A single `ApiError` enum covering the five error kinds the recommendation
//! pipeline can surface, with `IntoResponse` mapping to the status codes
//! used by the HTTP route handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// API error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for client-side handling
    pub code: &'static str,
    /// Human-readable error message
    pub message: String,
}

/// API error type covering the recommendation pipeline's failure modes
#[derive(Error, Debug)]
pub enum ApiError {
    /// Seed id is absent from the catalogue
    #[error("seed not found: {0}")]
    SeedNotFound(i64),

    /// Seed key is absent from the co-listening vocabulary
    #[error("seed not in collaborative-filtering vocabulary: {0}")]
    SeedUnknownToCf(i64),

    /// CF retrieval produced no surviving candidates
    #[error("cf candidate generation failed")]
    CfGenerationFailed,

    /// The catalogue (or the engine built on it) failed to load
    #[error("recommendation engine not initialized")]
    EngineUninitialized,

    /// Catch-all for unexpected failures
    #[error("internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::SeedNotFound(_) | Self::SeedUnknownToCf(_) => StatusCode::NOT_FOUND,
            Self::CfGenerationFailed | Self::EngineUninitialized => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Error code string for client-side handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SeedNotFound(_) => "SEED_NOT_FOUND",
            Self::SeedUnknownToCf(_) => "SEED_UNKNOWN_TO_CF",
            Self::CfGenerationFailed => "CF_GENERATION_FAILED",
            Self::EngineUninitialized => "ENGINE_UNINITIALIZED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Log the error with severity matched to its status code
    pub fn log(&self) {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        } else {
            tracing::debug!(error = %self, code = self.error_code(), "request rejected");
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status_code();
        let body = ErrorResponse {
            code: self.error_code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ApiError>() {
            Ok(api_err) => api_err,
            Err(err) => Self::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_spec_table() {
        assert_eq!(ApiError::SeedNotFound(1).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::SeedUnknownToCf(1).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::CfGenerationFailed.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::EngineUninitialized.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_codes_are_stable_strings() {
        assert_eq!(ApiError::SeedNotFound(1).error_code(), "SEED_NOT_FOUND");
        assert_eq!(ApiError::CfGenerationFailed.error_code(), "CF_GENERATION_FAILED");
    }
}
