//! Feed renderer for seadex-rss.
//!
//! Turns the newest snapshots of one id into an RSS 2.0 channel whose item
//! descriptions are HTML summaries of each stored SeaDex entry.

mod html;
mod payload;
mod render;

use thiserror::Error;

pub use payload::{Comparison, EntryPayload, Release, ReleaseFile};
pub use render::{build_channel, render_description, render_feed};

/// Media type of the rendered document.
pub const RSS_CONTENT_TYPE: &str = "application/rss+xml";

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("xml serialization failed: {0}")]
    Xml(#[from] rss::Error),
    #[error("feed is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
