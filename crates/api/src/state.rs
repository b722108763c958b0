use std::sync::Arc;

use figtally_core::ports::FigurineStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: both fields are behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Persistence behind the store ports (PostgreSQL in production).
    pub store: Arc<dyn FigurineStore>,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
}
