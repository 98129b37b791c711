use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use storewatch_core::cooldown::CooldownGate;
use storewatch_scrapers::{build_http_client, Aggregator, ScraperSet, StoreEndpoints};
use storewatch_storage::{DurableStore, GithubConfig, GithubContents, LocalFileStore, SnapshotStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storewatch_api::catalog::load_catalog;
use storewatch_api::config::{ServerConfig, StorageBackend};
use storewatch_api::router::build_app_router;
use storewatch_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "storewatch_api=debug,storewatch_scrapers=info,storewatch_storage=info,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Catalog ---
    let catalog = load_catalog(&config.catalog_path).expect("Failed to load application catalog");

    // --- Store adapters ---
    let client = build_http_client(Duration::from_secs(config.scrape_timeout_secs))
        .expect("Failed to build HTTP client");
    let aggregator = Aggregator::new(ScraperSet::new(client.clone(), StoreEndpoints::default()));

    // --- Snapshot storage ---
    let store: Arc<dyn SnapshotStore> = match config.storage_backend {
        StorageBackend::Github => {
            tracing::info!("Using GitHub snapshot storage");
            Arc::new(DurableStore::new(GithubContents::new(
                client,
                GithubConfig::from_env(),
            )))
        }
        StorageBackend::Local => {
            tracing::info!(path = %config.data_path.display(), "Using local snapshot storage");
            Arc::new(LocalFileStore::new(config.data_path.clone()))
        }
    };

    // --- Cooldown gate ---
    let gate = CooldownGate::new(
        TimeDelta::minutes(config.cooldown_minutes),
        config.update_secret.clone(),
    );
    if config.update_secret.is_none() {
        tracing::info!("UPDATE_SECRET not set; cooldown cannot be bypassed");
    }

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        catalog: Arc::new(catalog),
        store,
        aggregator: Arc::new(aggregator),
        gate: Arc::new(gate),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or (on Unix) SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
