//! Error types for model parsing.

use thiserror::Error;

/// Errors that can occur while interpreting model data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// The trailing token of a recognized payload is not a number.
    #[error("invalid number in payload '{payload}'")]
    InvalidNumber {
        /// The raw payload string.
        payload: String,
    },
}

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
