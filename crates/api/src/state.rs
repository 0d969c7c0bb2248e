use std::sync::Arc;

use studytrack_core::service::ProgressService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: the config is behind `Arc` and the service holds `Arc`ed stores.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub service: ProgressService,
}
