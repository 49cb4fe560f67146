use std::sync::Arc;

use prodscore_core::scoring::ModelHandle;
use prodscore_core::visualization::Visualizer;
use prodscore_pipeline::BatchJobManager;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Loaded scoring model, or the reason it could not be loaded.
    pub model: ModelHandle,
    /// Chart renderer for the single-record path.
    pub visualizer: Arc<dyn Visualizer>,
    /// Background batch job lifecycle.
    pub jobs: BatchJobManager,
}
