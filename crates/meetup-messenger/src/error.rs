//! Error types for Messenger operations.

use thiserror::Error;

/// Errors that can occur when talking to the Messenger platform.
#[derive(Debug, Error)]
pub enum MessengerError {
    /// Page access token not provided.
    #[error("Messenger access token not set. Set ACCESS_TOKEN environment variable.")]
    NoToken,

    /// The Graph API base URL could not be parsed.
    #[error("invalid Graph API url: {0}")]
    InvalidUrl(String),

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The Graph API answered with a non-success status.
    #[error("Graph API returned {status}: {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Response body, usually a JSON error object.
        body: String,
    },
}

/// Result type for Messenger operations.
pub type Result<T> = std::result::Result<T, MessengerError>;

impl From<reqwest::Error> for MessengerError {
    fn from(e: reqwest::Error) -> Self {
        MessengerError::HttpError(e.to_string())
    }
}

impl From<url::ParseError> for MessengerError {
    fn from(e: url::ParseError) -> Self {
        MessengerError::InvalidUrl(e.to_string())
    }
}
