//! Service layer for seadex-rss
//!
//! Decides when an id is due for an upstream check, detects whether the
//! fetched entry differs from the newest snapshot, and appends when it does.

#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]

mod error;
mod refresh_service;
mod staleness;
#[cfg(test)]
mod tests;

pub use error::ServiceError;
pub use refresh_service::{FeedSnapshots, RefreshOutcome, RefreshService};
pub use staleness::StalenessTracker;
