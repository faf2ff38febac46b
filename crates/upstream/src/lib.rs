//! Upstream clients for seadex-rss.
//!
//! [`SeadexClient`] reads entries from the SeaDex (PocketBase) REST API and
//! [`AnilistClient`] reads display titles and cover images from AniList.
//! Both sit behind small traits so the refresh logic can be tested without
//! a network.

mod anilist;
mod error;
mod seadex;

use async_trait::async_trait;
use seadex_rss_core::{DisplayMetadata, Entry, TrackedId};

pub use anilist::AnilistClient;
pub use error::UpstreamError;
pub use seadex::SeadexClient;

/// Source of the current catalog entry for an id.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// `Ok(None)` means the catalog answered but has no entry for `id`;
    /// `Err` means it could not be reached or its answer was unreadable.
    async fn fetch_entry(&self, id: TrackedId) -> Result<Option<Entry>, UpstreamError>;
}

/// Source of display metadata. Never fails: lookups that go wrong resolve
/// to [`DisplayMetadata::placeholder`].
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn fetch_display_metadata(&self, id: TrackedId) -> DisplayMetadata;
}

/// Builds the shared HTTP client with an explicit request timeout.
fn build_http_client(timeout: std::time::Duration) -> Result<reqwest::Client, UpstreamError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(seadex_rss_core::constants::USER_AGENT)
        .build()
        .map_err(|e| UpstreamError::ClientInit(e.to_string()))
}

/// Truncates a string to the given maximum length at a char boundary.
#[must_use]
pub(crate) fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end = end.saturating_sub(1);
        }
        s.get(..end).unwrap_or("")
    }
}
