//! Error types for the REST API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;


/// Error response body for quote fetch failures.
#[derive(Debug, Serialize)]
pub struct QuoteErrorResponse {
    /// Human-readable failure description.
    pub error: String,
}

/// Error response body for authorization and mutation failures.
///
/// The `reason` field is omitted for plain authorization failures so the
/// caller learns nothing beyond `{"status":"failed"}`.
#[derive(Debug, Serialize)]
pub struct StatusErrorResponse {
    /// Always `"failed"`.
    pub status: String,
    /// Failure reason, when one is exposed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// API error types.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Credentials did not match an active account.
    #[error("unauthorized")]
    Unauthorized,

    /// Target account does not exist.
    #[error("user {0} not found")]
    NotFound(String),

    /// Target account already exists.
    #[error("user already exists")]
    Conflict,

    /// Request carried nothing actionable.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The upstream quote API could not be reached or answered badly.
    #[error("Failed to fetch data for {ticker}: {reason}")]
    UpstreamFetch {
        /// Ticker the fetch was for.
        ticker: String,
        /// Underlying cause.
        reason: String,
    },

    /// Database connectivity or query failure.
    ///
    /// Mutation handlers expose the raw message in the `reason` field
    /// of the response; see DESIGN.md before tightening this.
    #[error("database error: {0}")]
    Database(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Unauthorized => {
                let body = Json(StatusErrorResponse {
                    status: "failed".to_string(),
                    reason: None,
                });
                (StatusCode::UNAUTHORIZED, body).into_response()
            }
            ApiError::UpstreamFetch { .. } => {
                let body = Json(QuoteErrorResponse {
                    error: self.to_string(),
                });
                (StatusCode::BAD_GATEWAY, body).into_response()
            }
            _ => {
                let status = match &self {
                    ApiError::NotFound(_) => StatusCode::NOT_FOUND,
                    ApiError::Conflict => StatusCode::CONFLICT,
                    ApiError::Validation(_) => StatusCode::BAD_REQUEST,
                    ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::Unauthorized | ApiError::UpstreamFetch { .. } => unreachable!(),
                };

                let body = Json(StatusErrorResponse {
                    status: "failed".to_string(),
                    reason: Some(self.to_string()),
                });

                (status, body).into_response()
            }
        }
    }
}
