use std::sync::Arc;

use storewatch_core::cooldown::CooldownGate;
use storewatch_core::types::Catalog;
use storewatch_scrapers::Aggregator;
use storewatch_storage::SnapshotStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc`. The snapshot itself is
/// never cached here; handlers read it from `store` on every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Tracked applications, loaded once at startup.
    pub catalog: Arc<Catalog>,
    pub store: Arc<dyn SnapshotStore>,
    pub aggregator: Arc<Aggregator>,
    pub gate: Arc<CooldownGate>,
}
