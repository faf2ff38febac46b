//! Typed error enum for the storage layer.
//!
//! Lets callers tell transient lock contention apart from corrupt rows or a
//! broken pool instead of downcasting opaque boxes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// Could not check out a connection.
    #[error("connection pool: {0}")]
    Pool(#[from] r2d2::Error),

    /// SQL / constraint / lock failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Row data could not be converted into a domain type.
    #[error("data corruption: {context}")]
    DataCorruption {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Schema migration failure.
    #[error("migration error: {0}")]
    Migration(String),

    /// Database directory could not be created.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking task running the query panicked or was cancelled.
    #[error("blocking task failed: {0}")]
    Join(String),
}

impl StorageError {
    /// Whether this error is likely transient (busy/locked database, pool timeout).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Pool(_) => true,
            Self::Database(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }
}
