use std::sync::Arc;

use mealsmith_llm::GenerationClient;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
/// The generation client is constructed once at startup and injected here,
/// so tests can substitute a fake provider.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: mealsmith_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Provider call layer for the synchronous generation path.
    pub generator: Arc<GenerationClient>,
}
