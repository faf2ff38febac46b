//! Async storage trait used by the service layer.

use async_trait::async_trait;
use seadex_rss_core::{NewSnapshot, Snapshot, TrackedId};

use crate::error::StorageError;

/// Append-only snapshot history. There is deliberately no update or delete.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Newest snapshot for `id`, if any.
    async fn latest_snapshot(&self, id: TrackedId) -> Result<Option<Snapshot>, StorageError>;

    /// Up to `limit` snapshots for `id`, newest first.
    async fn recent_snapshots(
        &self,
        id: TrackedId,
        limit: usize,
    ) -> Result<Vec<Snapshot>, StorageError>;

    /// Insert `snapshot` unless its payload equals the newest stored payload.
    ///
    /// Compare and insert run in one transaction. Returns the stored row, or
    /// `None` when nothing changed.
    async fn append_if_changed(
        &self,
        snapshot: &NewSnapshot,
    ) -> Result<Option<Snapshot>, StorageError>;

    /// Number of stored snapshots for `id`.
    async fn count_snapshots(&self, id: TrackedId) -> Result<usize, StorageError>;
}
