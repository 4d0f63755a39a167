//! The two failure kinds every interaction can end in.
//!
//! [`AppError::Validation`] is bad or missing user input: reported inline
//! with the offending detail, never logged. [`AppError::Upstream`] is an
//! external API or store failure: the detail goes to the operator log and
//! the caller gets a generic retry prompt. Nothing here is fatal to the
//! process; every handler converts its error into a response at the
//! boundary of the triggering request.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Caller-facing text for any upstream failure. The real detail is logged.
const UPSTREAM_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Error, Debug)]
pub enum AppError {
    /// Bad or missing user input.
    #[error("{0}")]
    Validation(String),

    /// An external API or store failed.
    #[error("{0}")]
    Upstream(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn upstream(detail: impl Into<String>) -> Self {
        Self::Upstream(detail.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": message })),
            )
                .into_response(),
            AppError::Upstream(detail) => {
                tracing::error!("upstream failure: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": UPSTREAM_MESSAGE })),
                )
                    .into_response()
            }
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Upstream(err.to_string())
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Upstream(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Upstream(err.to_string())
    }
}
