// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error types for the submission pipeline

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Terminal outcome of a rejected submission.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("{message}")]
    RateLimited { message: String, retry_after: Duration },

    #[error("Content-Type must be application/json")]
    UnsupportedMediaType,

    #[error("Unauthorized")]
    Unauthenticated,

    #[error("Payload exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Validation failed")]
    Validation(Vec<String>),

    #[error("Failed to save email: {0}")]
    StoreFailure(String),

    #[error("Internal server error")]
    UnexpectedFailure,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntakeError {
    pub fn status(&self) -> StatusCode {
        match self {
            IntakeError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            IntakeError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            IntakeError::Unauthenticated => StatusCode::UNAUTHORIZED,
            IntakeError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            IntakeError::MalformedPayload(_) | IntakeError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            IntakeError::StoreFailure(_) | IntakeError::UnexpectedFailure => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Label used for the submissions counter.
    pub fn outcome(&self) -> &'static str {
        match self {
            IntakeError::RateLimited { .. } => "rate_limited",
            IntakeError::UnsupportedMediaType => "unsupported_media_type",
            IntakeError::Unauthenticated => "unauthenticated",
            IntakeError::PayloadTooLarge { .. } => "payload_too_large",
            IntakeError::MalformedPayload(_) => "malformed_payload",
            IntakeError::Validation(_) => "invalid",
            IntakeError::StoreFailure(_) => "store_failure",
            IntakeError::UnexpectedFailure => "unexpected_failure",
        }
    }

    fn body(self) -> ErrorResponse {
        match self {
            IntakeError::MalformedPayload(detail) => ErrorResponse {
                error: "Malformed payload".to_string(),
                details: Some(vec![detail]),
            },
            IntakeError::Validation(details) => ErrorResponse {
                error: "Validation failed".to_string(),
                details: Some(details),
            },
            IntakeError::StoreFailure(detail) => ErrorResponse {
                error: "Failed to save email".to_string(),
                details: Some(vec![detail]),
            },
            other => ErrorResponse {
                error: other.to_string(),
                details: None,
            },
        }
    }
}

impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let IntakeError::RateLimited { retry_after, .. } = &self {
            // Round up so clients never retry inside the window.
            let secs = retry_after.as_millis().div_ceil(1000).max(1);
            return (
                status,
                [(header::RETRY_AFTER, secs.to_string())],
                Json(self.body()),
            )
                .into_response();
        }

        (status, Json(self.body())).into_response()
    }
}
