//! HTTP surface
//!
//! Routes:
//! - `GET /{version}/search?q=...` runs the strategy named by `version`
//! - `GET /health` reports the published snapshot
//! - `POST /admin/reload` rebuilds the snapshot from the corpus file
//!
//! SIGUSR1 also triggers a reload; SIGTERM, SIGINT and SIGHUP stop the
//! server after in-flight requests finish.

mod handlers;
mod signals;

pub use handlers::{
    handle_health, handle_reload, handle_search, status_for, HealthResponse, SearchParams,
};
pub use signals::{ServerSignal, SignalHandler};

use crate::config::Config;
use crate::corpus::{CorpusSource, Snapshot, SnapshotBuilder, SnapshotStore};
use crate::error::{Result, TagsearchError};
use crate::retrieval::SearchEngine;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SnapshotStore>,
    pub engine: Arc<SearchEngine>,
    pub embed_timeout: Duration,
}

impl AppState {
    pub fn new(store: Arc<SnapshotStore>, engine: Arc<SearchEngine>, embed_timeout: Duration) -> Self {
        Self {
            store,
            engine,
            embed_timeout,
        }
    }

    /// Initialize the embedding backend, load the first snapshot and the
    /// query collaborators.
    ///
    /// Fails when the corpus cannot be loaded: the server never starts
    /// without data.
    pub fn from_config(config: &Config) -> Result<Self> {
        let embedder = crate::embedding::from_config(&config.embedding)?;
        let builder = SnapshotBuilder::new(CorpusSource::from_config(&config.corpus), embedder.clone());
        let store = SnapshotStore::open(builder)?;
        let engine = SearchEngine::from_config(config, embedder)?;

        Ok(Self::new(
            Arc::new(store),
            Arc::new(engine),
            Duration::from_millis(config.embedding.timeout_ms),
        ))
    }
}

/// Build the HTTP router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/admin/reload", post(handle_reload))
        .route("/:version/search", get(handle_search))
        .with_state(state)
}

/// Rebuild the snapshot on the blocking pool
pub async fn reload_snapshot(store: Arc<SnapshotStore>) -> Result<Arc<Snapshot>> {
    tokio::task::spawn_blocking(move || store.reload())
        .await
        .map_err(|e| TagsearchError::Server(format!("Reload task failed: {}", e)))?
}

/// Serve until a shutdown signal arrives
pub async fn run(bind: &str, state: AppState) -> Result<()> {
    let addr: SocketAddr = bind.parse().map_err(|_| TagsearchError::InvalidConfigValue {
        path: "server.bind".to_string(),
        message: format!("Invalid bind address: '{}'", bind),
    })?;

    let signals = SignalHandler::new()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| TagsearchError::Io {
            source: e,
            context: format!("Failed to bind {}", addr),
        })?;

    let store = state.store.clone();
    tracing::info!("HTTP server listening on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(watch_signals(signals, store))
        .await
        .map_err(|e| TagsearchError::Io {
            source: e,
            context: "HTTP server failed".to_string(),
        })?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Resolves on the first shutdown signal; reload signals are handled inline
async fn watch_signals(mut signals: SignalHandler, store: Arc<SnapshotStore>) {
    loop {
        match signals.wait().await {
            ServerSignal::Reload => {
                if let Err(e) = reload_snapshot(store.clone()).await {
                    tracing::error!("Signal-triggered reload failed: {}", e);
                }
            }
            ServerSignal::Shutdown => {
                tracing::info!("Shutting down, waiting for in-flight requests");
                return;
            }
        }
    }
}
