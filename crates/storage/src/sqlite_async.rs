//! Async trait implementation for SQLite `Storage` via `spawn_blocking`.

use async_trait::async_trait;
use seadex_rss_core::{NewSnapshot, Snapshot, TrackedId};

use crate::traits::SnapshotStore;
use crate::{Storage, StorageError};

/// Helper: run a blocking closure on the tokio blocking pool.
async fn blocking<F, T>(f: F) -> Result<T, StorageError>
where
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StorageError::Join(e.to_string()))?
}

/// Body-generating macro for async-to-blocking delegation.
///
/// Each argument is annotated with a capture kind:
/// - `@ref arg`: `.clone()` a `&T`, pass as `&arg`
/// - `@val arg`: move directly (Copy/owned types)
macro_rules! delegate {
    ($self:ident, $method:ident $(, @$kind:ident $arg:ident)*) => {{
        let s = $self.clone();
        $(delegate!(@capture $kind $arg);)*
        blocking(move || s.$method($(delegate!(@pass $kind $arg)),*)).await
    }};
    (@capture ref $arg:ident) => { let $arg = $arg.clone(); };
    (@capture val $arg:ident) => { };
    (@pass ref $arg:ident) => { &$arg };
    (@pass val $arg:ident) => { $arg };
}

#[async_trait]
impl SnapshotStore for Storage {
    async fn latest_snapshot(&self, id: TrackedId) -> Result<Option<Snapshot>, StorageError> {
        delegate!(self, latest_snapshot, @val id)
    }

    async fn recent_snapshots(
        &self,
        id: TrackedId,
        limit: usize,
    ) -> Result<Vec<Snapshot>, StorageError> {
        delegate!(self, recent_snapshots, @val id, @val limit)
    }

    async fn append_if_changed(
        &self,
        snapshot: &NewSnapshot,
    ) -> Result<Option<Snapshot>, StorageError> {
        delegate!(self, append_if_changed, @ref snapshot)
    }

    async fn count_snapshots(&self, id: TrackedId) -> Result<usize, StorageError> {
        delegate!(self, count_snapshots, @val id)
    }
}
