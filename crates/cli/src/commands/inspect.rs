//! One-shot subcommands that print to stdout.

use anyhow::{Result, bail};
use chrono::Utc;
use seadex_rss_core::{AppConfig, TrackedId};
use seadex_rss_feed::render_feed;

use super::{build_refresh_service, open_storage};

pub(crate) async fn feed(config: &AppConfig, id: TrackedId) -> Result<()> {
    let service = build_refresh_service(config, open_storage(config)?)?;
    let feed = service.feed(id, Utc::now()).await?;
    tracing::info!(tracked_id = %id, outcome = %feed.outcome, "feed ready");
    println!("{}", render_feed(&feed.snapshots, id)?);
    Ok(())
}

pub(crate) async fn history(config: &AppConfig, id: TrackedId, limit: usize) -> Result<()> {
    let service = build_refresh_service(config, open_storage(config)?)?;
    let snapshots = service.history(id, limit).await?;
    println!("{}", serde_json::to_string_pretty(&snapshots)?);
    Ok(())
}

pub(crate) async fn refresh(config: &AppConfig, id: TrackedId) -> Result<()> {
    let service = build_refresh_service(config, open_storage(config)?)?;
    let outcome = service.refresh_now(id, Utc::now()).await;
    println!("{outcome}");
    if outcome.is_failure() {
        bail!("refresh for Anilist ID {id} failed: {outcome}");
    }
    Ok(())
}

pub(crate) fn list(config: &AppConfig) -> Result<()> {
    let storage = open_storage(config)?;
    for id in storage.tracked_ids()? {
        println!("{id}");
    }
    Ok(())
}
