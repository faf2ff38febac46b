use std::sync::Arc;

use anyhow::Result;
use seadex_rss_core::AppConfig;
use seadex_rss_service::{RefreshService, StalenessTracker};
use seadex_rss_storage::Storage;
use seadex_rss_upstream::{AnilistClient, SeadexClient};

pub(crate) mod inspect;
pub(crate) mod serve;

pub(crate) fn open_storage(config: &AppConfig) -> Result<Storage> {
    let storage = Storage::with_pool_size(&config.db_path, config.db_pool_size)?;
    tracing::debug!(path = %config.db_path.display(), "database opened");
    Ok(storage)
}

/// Wires the store and both upstream clients into a refresh service.
pub(crate) fn build_refresh_service(
    config: &AppConfig,
    storage: Storage,
) -> Result<Arc<RefreshService>> {
    let catalog = SeadexClient::new(&config.catalog_url, config.upstream_timeout)?;
    let metadata = AnilistClient::new(&config.metadata_url, config.upstream_timeout)?;
    let staleness = Arc::new(StalenessTracker::new(config.update_interval));

    let service =
        RefreshService::new(Arc::new(storage), Arc::new(catalog), Arc::new(metadata), staleness)
            .with_fetch_timeout(config.upstream_timeout)
            .with_feed_limit(config.feed_limit);
    Ok(Arc::new(service))
}
