//! Error types for the bot.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use meetup_messenger::MessengerError;
use meetup_models::ModelError;
use meetup_store::StoreError;

/// Errors raised while handling a messaging event.
#[derive(Debug, Error)]
pub enum BotError {
    /// The event lacks a field the handler needs.
    #[error("malformed messaging event: {0}")]
    MalformedEvent(&'static str),

    /// The payload could not be parsed.
    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] ModelError),

    /// The command exists but has no behavior yet.
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Messenger error.
    #[error("messenger error: {0}")]
    Messenger(#[from] MessengerError),
}

/// Result type for bot operations.
pub type Result<T> = std::result::Result<T, BotError>;

/// HTTP-facing error with a status code and JSON body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Verification token mismatch or wrong mode.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string()
        }));
        (status, body).into_response()
    }
}
