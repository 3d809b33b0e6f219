//! HTTP server implementation using Axum.

use crate::handlers::{handle_health, handle_rpc};
use axum::{
    routing::{get, post},
    Router,
};
use banner_core::{
    BannerEngine, Debouncer, EngineConfig, FsVault, SettingsStore, TokioClock,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Application state shared across handlers.
pub struct AppState {
    /// Banner engine for the vault
    pub engine: BannerEngine,
    /// Vault on disk, also the metadata source
    pub vault: Arc<FsVault>,
    /// Settings persistence
    pub settings_store: SettingsStore,
    /// Coalesces bursts of metadata changes per document path
    pub debouncer: Debouncer<String>,
}

impl AppState {
    /// Build state for a vault, loading settings from `settings_path` or the
    /// default location inside the vault.
    pub fn open(vault_root: PathBuf, settings_path: Option<PathBuf>) -> anyhow::Result<Self> {
        Self::with_debounce_window(vault_root, settings_path, EngineConfig::METADATA_DEBOUNCE)
    }

    pub fn with_debounce_window(
        vault_root: PathBuf,
        settings_path: Option<PathBuf>,
        window: Duration,
    ) -> anyhow::Result<Self> {
        let settings_store = match settings_path {
            Some(path) => SettingsStore::new(path),
            None => SettingsStore::for_vault(&vault_root),
        };
        info!("Settings file: {}", settings_store.path().display());

        let settings = match settings_store.load() {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to load settings, using defaults: {}", e);
                Default::default()
            }
        };

        let vault = Arc::new(FsVault::new(vault_root));
        let engine = BannerEngine::builder(vault.clone(), vault.clone())
            .settings(settings)
            .build()?;

        Ok(Self {
            engine,
            vault,
            settings_store,
            debouncer: Debouncer::new(Arc::new(TokioClock), window),
        })
    }
}

/// Build the router with CORS and both endpoints.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Configure CORS for the editor's renderer process
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/rpc", post(handle_rpc))
        .layer(cors)
        .with_state(state)
}

/// Start the JSON-RPC HTTP server.
///
/// Returns the actual address the server is bound to (useful when port=0).
pub async fn start_server(state: AppState, host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    let app = build_router(Arc::new(state));

    // Parse the address
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    // Bind to the address
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("Server listening on {}", actual_addr);

    // Spawn the server in the background
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok(actual_addr)
}
