use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DisplayMetadata, Entry, TrackedId};

/// Immutable, timestamped capture of an entry as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Surrogate key, monotonic by insertion order.
    pub id: i64,
    pub tracked_id: TrackedId,
    /// Capture time, always UTC.
    pub timestamp: DateTime<Utc>,
    /// Canonical JSON of the upstream entry.
    pub payload: String,
    pub display_title: String,
    pub cover_image_url: Option<String>,
}

/// Snapshot not yet persisted; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSnapshot {
    pub tracked_id: TrackedId,
    pub timestamp: DateTime<Utc>,
    pub payload: String,
    pub display_title: String,
    pub cover_image_url: Option<String>,
}

impl NewSnapshot {
    #[must_use]
    pub fn new(
        tracked_id: TrackedId,
        timestamp: DateTime<Utc>,
        entry: &Entry,
        metadata: DisplayMetadata,
    ) -> Self {
        Self {
            tracked_id,
            timestamp,
            payload: entry.canonical_payload(),
            display_title: metadata.title,
            cover_image_url: metadata.cover_image_url,
        }
    }
}
