//! `SQLite` storage implementation.
//!
//! All methods are synchronous; see `sqlite_async` for the async wrappers.

// SQLite uses i64 for counts/limits, Rust uses usize - safe conversions within DB context
#![allow(
    clippy::as_conversions,
    clippy::cast_possible_wrap,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "SQLite i64 <-> Rust usize conversions are safe within DB row counts"
)]

mod snapshots;

use std::path::Path;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use seadex_rss_core::constants::DEFAULT_DB_POOL_SIZE;

use crate::StorageError;
use crate::migrations;

/// Type alias for pooled connection
pub(crate) type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Main storage struct wrapping `SQLite` connection pool
#[derive(Clone, Debug)]
pub struct Storage {
    pub(crate) pool: Pool<SqliteConnectionManager>,
}

/// Get a connection from the pool
pub(crate) fn get_conn(pool: &Pool<SqliteConnectionManager>) -> Result<PooledConn, StorageError> {
    Ok(pool.get()?)
}

/// Concurrency settings applied to every pooled connection
fn init_connection(conn: &mut Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA busy_timeout = 30000;
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;",
    )?;
    Ok(())
}

impl Storage {
    /// Open (or create) the database at `db_path` with the default pool size.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created, the pool cannot
    /// be built, or migrations fail.
    pub fn new(db_path: &Path) -> Result<Self, StorageError> {
        Self::with_pool_size(db_path, DEFAULT_DB_POOL_SIZE)
    }

    /// Open (or create) the database at `db_path` with `pool_size` connections.
    ///
    /// # Errors
    /// See [`Storage::new`].
    pub fn with_pool_size(db_path: &Path, pool_size: u32) -> Result<Self, StorageError> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let manager = SqliteConnectionManager::file(db_path).with_init(init_connection);
        let pool = Pool::builder().max_size(pool_size.max(1)).build(manager)?;

        // Run migrations on first connection
        let conn = pool.get()?;
        migrations::run_migrations(&conn)?;
        drop(conn);

        tracing::info!(
            path = %db_path.display(),
            pool_size = pool_size,
            "Storage initialized with connection pool"
        );

        Ok(Self { pool })
    }
}
