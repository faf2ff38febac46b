//! Typed error enum for the service layer.
//!
//! Upstream failures never show up here: they are absorbed into a
//! [`RefreshOutcome`]. What remains is storage trouble on the read path and
//! the one user-visible failure, an id with no history.

use seadex_rss_core::TrackedId;
use seadex_rss_storage::StorageError;
use thiserror::Error;

use crate::RefreshOutcome;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Reading snapshots failed.
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// No snapshot exists for the id, even after the refresh attempt.
    #[error("no snapshots available for Anilist ID {id} (refresh: {outcome})")]
    NoSnapshots { id: TrackedId, outcome: RefreshOutcome },
}

impl ServiceError {
    /// Whether this error represents a not-found condition.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NoSnapshots { .. })
    }

    /// Whether this error is likely transient (worth retrying).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_transient(),
            Self::NoSnapshots { .. } => false,
        }
    }
}
