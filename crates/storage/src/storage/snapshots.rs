use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use rusqlite::types::Type;
use rusqlite::{OptionalExtension as _, TransactionBehavior, params};
use seadex_rss_core::{NewSnapshot, Snapshot, TrackedId};

use super::{Storage, get_conn};
use crate::StorageError;

const SNAPSHOT_COLUMNS: &str =
    "id, tracked_id, timestamp, payload, display_title, cover_image_url";

/// Sub-microsecond digits are not stored.
const STORED_SUBSEC_DIGITS: u16 = 6;

/// Fixed-width UTC form, so lexical order in SQLite equals time order.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_snapshot(row: &rusqlite::Row<'_>) -> rusqlite::Result<Snapshot> {
    let tracked_id: u32 = row.get(1)?;
    let timestamp: String = row.get(2)?;
    Ok(Snapshot {
        id: row.get(0)?,
        tracked_id: TrackedId::new(tracked_id),
        timestamp: parse_timestamp(2, &timestamp)?,
        payload: row.get(3)?,
        display_title: row.get(4)?,
        cover_image_url: row.get(5)?,
    })
}

fn map_row_error(err: rusqlite::Error) -> StorageError {
    match err {
        rusqlite::Error::FromSqlConversionFailure(idx, _, source) => {
            StorageError::DataCorruption { context: format!("snapshot column {idx}"), source }
        },
        other => StorageError::Database(other),
    }
}

impl Storage {
    /// Newest snapshot for `id`.
    ///
    /// # Errors
    /// Returns error if the query fails or the row is corrupt.
    pub fn latest_snapshot(&self, id: TrackedId) -> Result<Option<Snapshot>, StorageError> {
        let conn = get_conn(&self.pool)?;
        conn.query_row(
            &format!(
                "SELECT {SNAPSHOT_COLUMNS} FROM snapshots WHERE tracked_id = ?1
                   ORDER BY timestamp DESC, id DESC LIMIT 1"
            ),
            params![i64::from(id)],
            row_to_snapshot,
        )
        .optional()
        .map_err(map_row_error)
    }

    /// Up to `limit` snapshots for `id`, newest first.
    ///
    /// # Errors
    /// Returns error if the query fails or a row is corrupt.
    pub fn recent_snapshots(
        &self,
        id: TrackedId,
        limit: usize,
    ) -> Result<Vec<Snapshot>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM snapshots WHERE tracked_id = ?1
               ORDER BY timestamp DESC, id DESC LIMIT ?2"
        ))?;
        let rows = stmt.query_map(params![i64::from(id), limit as i64], row_to_snapshot)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_row_error)
    }

    /// Insert `snapshot` unless its payload equals the newest stored one.
    ///
    /// Runs under `BEGIN IMMEDIATE`, so two writers racing on the same id
    /// serialize and the loser sees the winner's row. A timestamp older than
    /// the newest stored one is raised to it; history never goes backwards.
    ///
    /// # Errors
    /// Returns error if the transaction fails; nothing is written in that case.
    pub fn append_if_changed(
        &self,
        snapshot: &NewSnapshot,
    ) -> Result<Option<Snapshot>, StorageError> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let latest: Option<(String, String)> = tx
            .query_row(
                "SELECT payload, timestamp FROM snapshots WHERE tracked_id = ?1
                   ORDER BY timestamp DESC, id DESC LIMIT 1",
                params![i64::from(snapshot.tracked_id)],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let mut timestamp = snapshot.timestamp.trunc_subsecs(STORED_SUBSEC_DIGITS);
        if let Some((payload, latest_ts)) = latest {
            if payload == snapshot.payload {
                return Ok(None);
            }
            let latest_ts = parse_timestamp(1, &latest_ts).map_err(map_row_error)?;
            if latest_ts > timestamp {
                tracing::warn!(
                    tracked_id = %snapshot.tracked_id,
                    requested = %timestamp,
                    latest = %latest_ts,
                    "snapshot timestamp older than history, clamping"
                );
                timestamp = latest_ts;
            }
        }

        tx.execute(
            "INSERT INTO snapshots
               (tracked_id, timestamp, payload, display_title, cover_image_url)
               VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                i64::from(snapshot.tracked_id),
                format_timestamp(&timestamp),
                snapshot.payload,
                snapshot.display_title,
                snapshot.cover_image_url,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Some(Snapshot {
            id,
            tracked_id: snapshot.tracked_id,
            timestamp,
            payload: snapshot.payload.clone(),
            display_title: snapshot.display_title.clone(),
            cover_image_url: snapshot.cover_image_url.clone(),
        }))
    }

    /// Number of snapshots stored for `id`.
    ///
    /// # Errors
    /// Returns error if the query fails.
    pub fn count_snapshots(&self, id: TrackedId) -> Result<usize, StorageError> {
        let conn = get_conn(&self.pool)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM snapshots WHERE tracked_id = ?1",
            params![i64::from(id)],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Every id with at least one snapshot, ascending.
    ///
    /// # Errors
    /// Returns error if the query fails.
    pub fn tracked_ids(&self) -> Result<Vec<TrackedId>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt =
            conn.prepare("SELECT DISTINCT tracked_id FROM snapshots ORDER BY tracked_id")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, u32>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids.into_iter().map(TrackedId::new).collect())
    }
}
