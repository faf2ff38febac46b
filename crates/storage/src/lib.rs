//! Storage layer for seadex-rss
//!
//! Append-only SQLite table of entry snapshots behind an r2d2 pool.
//! Synchronous methods live on [`Storage`]; async callers go through the
//! [`SnapshotStore`] trait, which runs them on the blocking pool.

mod error;
mod migrations;
mod sqlite_async;
mod storage;
#[cfg(test)]
mod tests;
pub mod traits;

pub use error::StorageError;
pub use storage::Storage;
pub use traits::SnapshotStore;
