//! HTTP API server for seadex-rss.

#![allow(unreachable_pub, reason = "pub items are re-exported")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::exhaustive_structs, reason = "HTTP types are stable")]

pub mod api_error;
mod api_types;
mod handlers;

use std::sync::Arc;

use axum::{Router, routing::get};
use seadex_rss_service::RefreshService;
use tower_http::trace::TraceLayer;

pub use api_types::{ServiceInfo, UsageInfo, VersionResponse};

/// Shared application state for all HTTP handlers.
pub struct AppState {
    /// Refresh policy, snapshot store and upstream clients.
    pub refresh_service: Arc<RefreshService>,
}

impl AppState {
    #[must_use]
    pub fn new(refresh_service: Arc<RefreshService>) -> Self {
        Self { refresh_service }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::info::root))
        .route("/health", get(handlers::info::health))
        .route("/api/version", get(handlers::info::version))
        .route("/{tracked_id}", get(handlers::feed::get_feed))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
