//! Application state for HTTP handlers.

use std::sync::Arc;

use crate::core::lifecycle::LifecycleService;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Lifecycle operations over the configured store
    pub service: Arc<LifecycleService>,
    /// Port the listener is bound to, reported by `GET /`
    pub port: u16,
}

impl AppState {
    pub fn new(service: LifecycleService, port: u16) -> Self {
        Self {
            service: Arc::new(service),
            port,
        }
    }
}
