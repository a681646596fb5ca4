//! Application state management

use manas_core::geo::PlaceFinder;
use manas_core::ModelRegistry;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
    pub places: Arc<dyn PlaceFinder>,
}

impl AppState {
    pub fn new(registry: ModelRegistry, places: Arc<dyn PlaceFinder>) -> Self {
        Self {
            registry: Arc::new(registry),
            places,
        }
    }
}
