use std::sync::Arc;

use reetr_backend::BackendApi;

use crate::config::ServerConfig;
use crate::drafts::DraftStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (token validation, claim namespace).
    pub config: Arc<ServerConfig>,
    /// Open assessment drafts.
    pub drafts: Arc<DraftStore>,
    /// Client for the content backend.
    pub backend: Arc<BackendApi>,
}

impl AppState {
    /// Build state from configuration with an empty draft store.
    pub fn new(config: ServerConfig) -> Self {
        let backend = BackendApi::new(config.backend_api_url.clone());
        Self {
            config: Arc::new(config),
            drafts: Arc::new(DraftStore::new()),
            backend: Arc::new(backend),
        }
    }
}
