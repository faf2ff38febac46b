use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{extract::State, Json};

use seadex_rss_feed::RSS_CONTENT_TYPE;

use crate::api_types::{ServiceInfo, UsageInfo, VersionResponse};
use crate::AppState;

pub async fn root(State(state): State<Arc<AppState>>) -> Json<ServiceInfo> {
    let endpoints = BTreeMap::from([
        ("/", "This help message"),
        ("/{anilist_id}", "Get RSS feed for a specific Anilist ID"),
    ]);
    Json(ServiceInfo {
        status: "healthy",
        message: "SeaDexRSS API is running",
        endpoints,
        usage: UsageInfo {
            description: "To use this API, make a GET request to /{anilist_id} where \
                          {anilist_id} is the Anilist ID of the anime you want to track.",
            example: "/12345",
            response_type: RSS_CONTENT_TYPE,
        },
        update_interval: format!("{} minutes", state.refresh_service.update_interval().num_minutes()),
    })
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn version() -> Json<VersionResponse> {
    Json(VersionResponse { version: env!("CARGO_PKG_VERSION") })
}
