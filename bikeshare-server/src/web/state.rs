//! Application state for the web layer.

use std::sync::Arc;

use crate::registry::SystemRegistry;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Engines for every configured deployment
    pub registry: Arc<SystemRegistry>,
}

impl AppState {
    pub fn new(registry: SystemRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }
}
