use std::sync::Arc;

use anyhow::Result;
use seadex_rss_core::AppConfig;
use seadex_rss_http::{AppState, create_router};

use super::{build_refresh_service, open_storage};

pub(crate) async fn run(config: AppConfig, host: String, port: u16) -> Result<()> {
    let storage = open_storage(&config)?;
    let refresh_service = build_refresh_service(&config, storage)?;

    let state = Arc::new(AppState::new(refresh_service));
    let router = create_router(state);
    let addr = format!("{host}:{port}");
    tracing::info!(
        addr = %addr,
        db = %config.db_path.display(),
        update_interval_minutes = config.update_interval_minutes(),
        catalog = %config.catalog_url,
        "starting HTTP server"
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
