mod config;
mod editor;
mod errors;
mod layout;
mod models;
mod render;
mod routes;
mod selection;
mod state;
mod workspace;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::layout::{builtin_library, LayoutLibrary, LayoutRanker, RemoteRankingClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Deck API v{}", env!("CARGO_PKG_VERSION"));

    // Layout library (read-only for the lifetime of the process)
    let library = match &config.layout_library_path {
        Some(path) => LayoutLibrary::load_from_path(path)
            .with_context(|| format!("loading layout library from {path}"))?,
        None => builtin_library(),
    };
    info!("Layout library ready: {} layouts", library.items.len());

    // Ranker: remote-first when configured, local heuristic otherwise
    let ranker = match &config.ranking_service_url {
        Some(url) => {
            let client = RemoteRankingClient::new(url.clone(), config.ranking_timeout)
                .context("building ranking service client")?;
            info!(
                "Remote ranking enabled: {} (timeout {}ms)",
                client.endpoint(),
                config.ranking_timeout.as_millis()
            );
            LayoutRanker::with_remote(Arc::new(client))
        }
        None => {
            info!("RANKING_SERVICE_URL not set, ranking locally");
            LayoutRanker::local()
        }
    };

    let state = AppState::new(config.clone(), library, ranker);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
