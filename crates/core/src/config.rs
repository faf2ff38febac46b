//! Runtime configuration collected from the environment.

use std::path::PathBuf;
use std::time::Duration;

use chrono::TimeDelta;

use crate::constants::{
    DATA_DIR_NAME, DB_FILE_NAME, DEFAULT_CATALOG_URL, DEFAULT_DB_POOL_SIZE, DEFAULT_FEED_LIMIT,
    DEFAULT_METADATA_URL, DEFAULT_UPDATE_INTERVAL_MINUTES, DEFAULT_UPSTREAM_TIMEOUT_SECS,
    MAX_HISTORY_LIMIT,
};
use crate::env_parse_with_default;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub db_pool_size: u32,
    /// Minimum time between two upstream checks of the same id.
    pub update_interval: TimeDelta,
    pub upstream_timeout: Duration,
    pub catalog_url: String,
    pub metadata_url: String,
    pub feed_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            db_pool_size: DEFAULT_DB_POOL_SIZE,
            update_interval: interval_from_minutes(DEFAULT_UPDATE_INTERVAL_MINUTES),
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            catalog_url: DEFAULT_CATALOG_URL.to_owned(),
            metadata_url: DEFAULT_METADATA_URL.to_owned(),
            feed_limit: DEFAULT_FEED_LIMIT,
        }
    }
}

impl AppConfig {
    /// Reads `SEADEX_RSS_*` variables, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let db_path = std::env::var("SEADEX_RSS_DB_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map_or(defaults.db_path, PathBuf::from);
        let catalog_url = std::env::var("SEADEX_RSS_CATALOG_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(defaults.catalog_url);
        let metadata_url = std::env::var("SEADEX_RSS_METADATA_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(defaults.metadata_url);

        Self {
            db_path,
            db_pool_size: env_parse_with_default("SEADEX_RSS_DB_POOL_SIZE", DEFAULT_DB_POOL_SIZE)
                .max(1),
            update_interval: interval_from_minutes(env_parse_with_default(
                "SEADEX_RSS_UPDATE_INTERVAL_MINUTES",
                DEFAULT_UPDATE_INTERVAL_MINUTES,
            )),
            upstream_timeout: Duration::from_secs(
                env_parse_with_default(
                    "SEADEX_RSS_UPSTREAM_TIMEOUT_SECS",
                    DEFAULT_UPSTREAM_TIMEOUT_SECS,
                )
                .max(1),
            ),
            catalog_url,
            metadata_url,
            feed_limit: env_parse_with_default("SEADEX_RSS_FEED_LIMIT", DEFAULT_FEED_LIMIT)
                .clamp(1, MAX_HISTORY_LIMIT),
        }
    }

    /// Overrides the update interval, keeping the current one on invalid input.
    #[must_use]
    pub fn with_update_interval_minutes(mut self, minutes: i64) -> Self {
        self.update_interval = interval_from_minutes(minutes);
        self
    }

    #[must_use]
    pub fn with_db_path(mut self, db_path: PathBuf) -> Self {
        self.db_path = db_path;
        self
    }

    #[must_use]
    pub fn update_interval_minutes(&self) -> i64 {
        self.update_interval.num_minutes()
    }
}

/// Negative or overflowing values fall back to the default interval.
fn interval_from_minutes(minutes: i64) -> TimeDelta {
    let fallback = TimeDelta::minutes(DEFAULT_UPDATE_INTERVAL_MINUTES);
    if minutes < 0 {
        tracing::warn!(minutes, "negative update interval, using default");
        return fallback;
    }
    TimeDelta::try_minutes(minutes).unwrap_or(fallback)
}

/// `{data_local_dir}/seadex-rss/seadexrss.db`, or the working directory when
/// the platform has no data dir.
#[must_use]
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
        .join(DB_FILE_NAME)
}
