//! Protocol Messages
//!
//! JSON bodies exchanged over HTTP, and the mapping from failures to
//! status codes. Every error body has the shape `{"detail": "..."}`.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::network::auth::AuthError;
use crate::store::{Level, ScoreRecord, StoreError, SubmitError};

// =============================================================================
// REQUESTS
// =============================================================================

/// Body of `POST /scoreboard/submit`. All three fields are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmission {
    /// Level played.
    pub level: Level,
    /// Player name.
    pub player_name: String,
    /// Completion time in seconds.
    pub time: f64,
}

impl From<ScoreSubmission> for ScoreRecord {
    fn from(sub: ScoreSubmission) -> Self {
        ScoreRecord::new(sub.level, sub.player_name, sub.time)
    }
}

// =============================================================================
// RESPONSES
// =============================================================================

/// Acknowledgement for an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitAck {
    /// Always `"success"`.
    pub status: String,
}

impl SubmitAck {
    /// The success acknowledgement.
    pub fn success() -> Self {
        Self { status: "success".to_string() }
    }
}

/// Error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human readable reason.
    pub detail: String,
}

// =============================================================================
// ERRORS
// =============================================================================

/// Failures surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or wrong `X-API-Key`.
    #[error("Invalid API Key")]
    Unauthorized(#[from] AuthError),

    /// Malformed path parameter or request body.
    #[error("{0}")]
    Validation(String),

    /// Submitted time is not strictly better than the stored one.
    #[error("New time is not better than existing time")]
    NotImproved,

    /// Table updated in memory but could not be written to disk.
    #[error("Score recorded but could not be saved")]
    Persistence(#[source] StoreError),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) | ApiError::NotImproved => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Rejected(SubmitError::NotImproved { .. }) => ApiError::NotImproved,
            other => ApiError::Persistence(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { detail: self.to_string() };
        (self.status_code(), Json(body)).into_response()
    }
}
