//! Test utilities and module declarations for storage tests.

use crate::Storage;
use chrono::{DateTime, TimeZone, Utc};
use seadex_rss_core::{NewSnapshot, TrackedId};
use tempfile::TempDir;

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_storage() -> (Storage, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let storage = Storage::new(&db_path).unwrap();
    (storage, temp_dir)
}

pub fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).single().unwrap_or_default()
}

pub fn create_test_snapshot(id: u32, day: u32, payload: &str) -> NewSnapshot {
    NewSnapshot {
        tracked_id: TrackedId::new(id),
        timestamp: at(day),
        payload: payload.to_owned(),
        display_title: format!("Title {id}"),
        cover_image_url: Some(format!("https://img.example/{id}.png")),
    }
}
