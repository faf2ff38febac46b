use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use seadex_rss_core::constants::{
    DEFAULT_FEED_LIMIT, DEFAULT_UPSTREAM_TIMEOUT_SECS, MAX_HISTORY_LIMIT,
};
use seadex_rss_core::{DisplayMetadata, NewSnapshot, Snapshot, TrackedId};
use seadex_rss_storage::SnapshotStore;
use seadex_rss_upstream::{CatalogSource, MetadataSource};
use serde::Serialize;

use crate::{ServiceError, StalenessTracker};

/// Result of one refresh attempt. Upstream and storage failures end up here
/// instead of propagating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// Checked recently; no upstream call was made.
    NoActionNeeded,
    /// Upstream matches the newest snapshot.
    Unchanged,
    /// A new snapshot was appended.
    Updated,
    /// Upstream answered with no entry for the id.
    UpstreamMiss,
    /// Upstream unreachable, slow or unreadable, or the store write failed.
    FetchError,
}

impl RefreshOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoActionNeeded => "no_action_needed",
            Self::Unchanged => "unchanged",
            Self::Updated => "updated",
            Self::UpstreamMiss => "upstream_miss",
            Self::FetchError => "fetch_error",
        }
    }

    /// The attempt produced no usable upstream data.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::UpstreamMiss | Self::FetchError)
    }
}

impl fmt::Display for RefreshOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshots ready for rendering, newest first, plus what the refresh did.
#[derive(Debug, Clone)]
pub struct FeedSnapshots {
    pub outcome: RefreshOutcome,
    pub snapshots: Vec<Snapshot>,
}

/// Per-id gate around a refresh. Holds the outcome of the refresh that last
/// ran under it, `None` while a caller is deciding or when it only checked.
type RefreshGate = Arc<tokio::sync::Mutex<Option<RefreshOutcome>>>;

pub struct RefreshService {
    store: Arc<dyn SnapshotStore>,
    catalog: Arc<dyn CatalogSource>,
    metadata: Arc<dyn MetadataSource>,
    staleness: Arc<StalenessTracker>,
    gates: Mutex<HashMap<TrackedId, RefreshGate>>,
    fetch_timeout: Duration,
    feed_limit: usize,
}

impl RefreshService {
    #[must_use]
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        catalog: Arc<dyn CatalogSource>,
        metadata: Arc<dyn MetadataSource>,
        staleness: Arc<StalenessTracker>,
    ) -> Self {
        Self {
            store,
            catalog,
            metadata,
            staleness,
            gates: Mutex::new(HashMap::new()),
            fetch_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            feed_limit: DEFAULT_FEED_LIMIT,
        }
    }

    /// Upper bound on each upstream call, on top of any transport timeout.
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_feed_limit(mut self, limit: usize) -> Self {
        self.feed_limit = limit.clamp(1, MAX_HISTORY_LIMIT);
        self
    }

    #[must_use]
    pub fn update_interval(&self) -> TimeDelta {
        self.staleness.interval()
    }

    #[must_use]
    pub fn staleness(&self) -> &StalenessTracker {
        &self.staleness
    }

    /// Refresh `id` if its last check is older than the update interval.
    ///
    /// The check time is recorded before the upstream call, so failed and
    /// in-flight attempts throttle exactly like successful ones. A caller
    /// that arrives while a refresh of the same id is running waits for it
    /// and reports its outcome instead of reading a store that is still empty.
    pub async fn refresh_if_needed(&self, id: TrackedId, now: DateTime<Utc>) -> RefreshOutcome {
        let gate = self.gate(id);
        let mut attempt = match gate.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                let guard = gate.lock().await;
                if let Some(outcome) = *guard {
                    tracing::debug!(tracked_id = %id, outcome = %outcome, "joined in-flight refresh");
                    return outcome;
                }
                guard
            },
        };
        *attempt = None;

        if !self.staleness.try_claim(id, now) {
            tracing::debug!(tracked_id = %id, "checked recently, serving stored snapshots");
            return RefreshOutcome::NoActionNeeded;
        }
        let outcome = self.refresh_now(id, now).await;
        *attempt = Some(outcome);
        outcome
    }

    fn gate(&self, id: TrackedId) -> RefreshGate {
        let mut gates = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(gates.entry(id).or_default())
    }

    /// Fetch, compare and append regardless of the staleness record.
    pub async fn refresh_now(&self, id: TrackedId, now: DateTime<Utc>) -> RefreshOutcome {
        let outcome = self.fetch_and_store(id, now).await;
        tracing::info!(tracked_id = %id, outcome = %outcome, "refresh finished");
        outcome
    }

    async fn fetch_and_store(&self, id: TrackedId, now: DateTime<Utc>) -> RefreshOutcome {
        let entry =
            match tokio::time::timeout(self.fetch_timeout, self.catalog.fetch_entry(id)).await {
                Err(_) => {
                    tracing::warn!(
                        tracked_id = %id,
                        timeout = ?self.fetch_timeout,
                        "SeaDex fetch timed out"
                    );
                    return RefreshOutcome::FetchError;
                },
                Ok(Err(e)) => {
                    tracing::warn!(
                        tracked_id = %id,
                        error = %e,
                        transient = e.is_transient(),
                        "SeaDex fetch failed"
                    );
                    return RefreshOutcome::FetchError;
                },
                Ok(Ok(None)) => return RefreshOutcome::UpstreamMiss,
                Ok(Ok(Some(entry))) => entry,
            };

        let payload = entry.canonical_payload();
        match self.store.latest_snapshot(id).await {
            Ok(Some(latest)) if latest.payload == payload => {
                tracing::debug!(tracked_id = %id, "no changes, skipping snapshot creation");
                return RefreshOutcome::Unchanged;
            },
            Ok(_) => {},
            Err(e) => {
                tracing::error!(tracked_id = %id, error = %e, "reading latest snapshot failed");
                return RefreshOutcome::FetchError;
            },
        }

        let metadata = self.fetch_metadata(id).await;
        let snapshot = NewSnapshot::new(id, now, &entry, metadata);

        match self.store.append_if_changed(&snapshot).await {
            Ok(Some(stored)) => {
                tracing::info!(
                    tracked_id = %id,
                    snapshot_id = stored.id,
                    title = %stored.display_title,
                    "new snapshot saved"
                );
                RefreshOutcome::Updated
            },
            // Another request stored the same payload between our read and write.
            Ok(None) => RefreshOutcome::Unchanged,
            Err(e) => {
                tracing::error!(tracked_id = %id, error = %e, "snapshot write rolled back");
                RefreshOutcome::FetchError
            },
        }
    }

    async fn fetch_metadata(&self, id: TrackedId) -> DisplayMetadata {
        match tokio::time::timeout(self.fetch_timeout, self.metadata.fetch_display_metadata(id))
            .await
        {
            Ok(meta) => meta,
            Err(_) => {
                tracing::warn!(tracked_id = %id, "AniList lookup timed out, using placeholder");
                DisplayMetadata::placeholder(id)
            },
        }
    }

    /// Refresh if due, then load the newest snapshots for the feed.
    ///
    /// # Errors
    /// `NoSnapshots` when the id has no history at all, `Storage` when the
    /// read fails.
    pub async fn feed(
        &self,
        id: TrackedId,
        now: DateTime<Utc>,
    ) -> Result<FeedSnapshots, ServiceError> {
        let outcome = self.refresh_if_needed(id, now).await;
        let snapshots = self.store.recent_snapshots(id, self.feed_limit).await?;
        if snapshots.is_empty() {
            return Err(ServiceError::NoSnapshots { id, outcome });
        }
        Ok(FeedSnapshots { outcome, snapshots })
    }

    /// Stored history for `id`, newest first, without touching upstream.
    pub async fn history(&self, id: TrackedId, limit: usize) -> Result<Vec<Snapshot>, ServiceError> {
        Ok(self.store.recent_snapshots(id, limit.clamp(1, MAX_HISTORY_LIMIT)).await?)
    }
}
