use std::sync::Arc;

use anyhow::Context as _;
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use seadex_rss_core::TrackedId;
use seadex_rss_feed::{RSS_CONTENT_TYPE, render_feed};

use crate::AppState;
use crate::api_error::ApiError;

/// `GET /{tracked_id}`: refresh if due, then render the stored history.
pub async fn get_feed(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = raw_id
        .parse::<TrackedId>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let feed = state.refresh_service.feed(id, Utc::now()).await?;
    tracing::debug!(
        tracked_id = %id,
        outcome = %feed.outcome,
        items = feed.snapshots.len(),
        "serving feed"
    );

    let xml = render_feed(&feed.snapshots, id).context("rendering RSS feed")?;
    Ok(([(header::CONTENT_TYPE, RSS_CONTENT_TYPE)], xml).into_response())
}
