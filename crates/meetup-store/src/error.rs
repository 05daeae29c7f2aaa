//! Error types for the store.

use thiserror::Error;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The database URL names a scheme we cannot open.
    #[error("unsupported database url: {0}")]
    UnsupportedUrl(String),

    /// Failed to create the directory holding the database file.
    #[error("failed to create directory {path}: {source}")]
    DirectoryError {
        /// Directory path.
        path: std::path::PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A previous holder of the connection panicked.
    #[error("database lock poisoned")]
    LockPoisoned,
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
