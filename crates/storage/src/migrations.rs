//! Database migrations, tracked through `PRAGMA user_version`.

use rusqlite::Connection;

use crate::StorageError;

pub const SCHEMA_VERSION: i32 = 1;

const V1_SNAPSHOTS: &str = "
CREATE TABLE IF NOT EXISTS snapshots (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tracked_id INTEGER NOT NULL,
    timestamp TEXT NOT NULL,
    payload TEXT NOT NULL,
    display_title TEXT NOT NULL,
    cover_image_url TEXT
);

CREATE INDEX IF NOT EXISTS idx_snapshots_tracked_time
    ON snapshots(tracked_id, timestamp DESC, id DESC);
";

pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    let current_version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    tracing::info!(
        "Database schema version: {} (target: {})",
        current_version,
        SCHEMA_VERSION
    );

    if current_version > SCHEMA_VERSION {
        return Err(StorageError::Migration(format!(
            "database schema v{current_version} is newer than supported v{SCHEMA_VERSION}"
        )));
    }

    if current_version < 1 {
        tracing::info!("Running migration v1: snapshots table");
        conn.execute_batch(V1_SNAPSHOTS)
            .map_err(|e| StorageError::Migration(format!("v1: {e}")))?;
    }

    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}
