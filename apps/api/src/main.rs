mod config;
mod errors;
mod export;
mod form;
mod models;
mod persistence;
mod render;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::export::renderer::HttpDocumentRenderer;
use crate::form::{FormController, TraceListener};
use crate::persistence::autosave::enable_autosave;
use crate::persistence::file_store::FileSnapshotStore;
use crate::persistence::redis_store::RedisSnapshotStore;
use crate::persistence::{clear_snapshot, load_snapshot, SnapshotStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Builder API v{}", env!("CARGO_PKG_VERSION"));

    // Snapshot store: Redis when configured, otherwise local files
    let store = build_store(&config)?;
    info!("Snapshot store initialized ({})", store.backend());

    // Start blank unless asked to pick up where the last session left off
    let mut session = FormController::new();
    session.subscribe(Box::new(TraceListener));
    if config.restore_on_start {
        match load_snapshot(store.as_ref()).await {
            Some(snapshot) => {
                session.restore(snapshot);
                info!("Restored saved form data");
            }
            None => info!("No saved form data to restore"),
        }
    } else if let Err(e) = clear_snapshot(store.as_ref()).await {
        warn!("Failed to clear saved form data at startup: {e}");
    }

    // Document renderer
    let renderer = Arc::new(HttpDocumentRenderer::new(
        config.render_service_url.clone(),
        config.render_timeout,
    )?);
    info!("Document renderer initialized ({})", config.render_service_url);

    let state = AppState::new(session, renderer, store.clone(), config.clone());

    if config.autosave_enabled {
        enable_autosave(state.session.clone(), store, config.autosave_debounce).await;
        info!(
            "Autosave enabled ({}ms debounce)",
            config.autosave_debounce.as_millis()
        );
    }

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_store(config: &Config) -> Result<Arc<dyn SnapshotStore>> {
    Ok(match &config.redis_url {
        Some(url) => Arc::new(RedisSnapshotStore::open(url)?),
        None => Arc::new(FileSnapshotStore::new(config.snapshot_dir.clone())),
    })
}
