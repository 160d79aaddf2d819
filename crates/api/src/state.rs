use std::sync::Arc;

use labelforge_pipeline::PipelineConfig;
use labelforge_storage::SharedStore;

use crate::config::ServerConfig;
use crate::ws::StatusHub;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    pub pool: labelforge_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Object storage gateway.
    pub store: SharedStore,
    /// Open status connections.
    pub hub: Arc<StatusHub>,
    /// Training and detection defaults applied to create requests.
    pub pipeline: Arc<PipelineConfig>,
}
