//! Connection wrapper.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::schema;

const SQLITE_SCHEME: &str = "sqlite://";

/// SQLite database shared across handlers.
pub struct Database {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl Database {
    /// Opens (or creates) the database file at `path`.
    ///
    /// The parent directory is created if it does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| StoreError::DirectoryError {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!(path = %path.display(), "opening database");
        let conn = Connection::open(path)?;
        Self::from_connection(conn, Some(path.to_path_buf()))
    }

    /// Opens the database named by a `DATABASE_URL` value.
    pub fn open_url(url: &str) -> Result<Self> {
        Self::open(path_from_url(url)?)
    }

    /// Opens a private in-memory database.
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, None)
    }

    fn from_connection(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Creates tables and indexes if they are missing.
    pub fn initialize(&self) -> Result<()> {
        self.with_connection(|conn| schema::create_tables(conn))
    }

    /// Path of the database file, `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Runs `f` with exclusive access to the connection.
    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        f(&conn)
    }

    /// Runs `f` inside a transaction that commits when `f` succeeds.
    pub fn with_transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> Result<T>,
    {
        let mut conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

/// Converts a `DATABASE_URL` value into a file path.
///
/// Accepts `sqlite://<path>` or a bare path. Other schemes are rejected.
pub fn path_from_url(url: &str) -> Result<PathBuf> {
    let url = url.trim();
    if let Some(rest) = url.strip_prefix(SQLITE_SCHEME) {
        if rest.is_empty() {
            return Err(StoreError::UnsupportedUrl(url.to_string()));
        }
        return Ok(PathBuf::from(rest));
    }
    if url.is_empty() || url.contains("://") {
        return Err(StoreError::UnsupportedUrl(url.to_string()));
    }
    Ok(PathBuf::from(url))
}
