use std::sync::Arc;

use appbee_core::Marketplace;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone; everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub marketplace: Arc<Marketplace>,
    pub config: Arc<ServerConfig>,
}
