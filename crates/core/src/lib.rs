//! Core types shared by all seadex-rss crates.
//!
//! Holds the tracked identifier, snapshot rows, the upstream entry wrapper
//! with its canonical serialization, and the runtime configuration.

mod config;
pub mod constants;
mod entry;
mod env_config;
mod snapshot;
mod tracked_id;

pub use config::AppConfig;
pub use entry::{DisplayMetadata, Entry, canonical_json};
pub use env_config::env_parse_with_default;
pub use snapshot::{NewSnapshot, Snapshot};
pub use tracked_id::{InvalidTrackedId, TrackedId};
