use std::sync::Arc;

use pms_core::store::Store;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; the store and config are behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The persistence backend selected at startup.
    pub store: Arc<dyn Store>,
    pub config: Arc<ServerConfig>,
}
