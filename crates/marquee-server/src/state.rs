//! Application state.

use std::sync::Arc;

use crate::cache::CacheCoordinator;
use crate::catalog::CatalogService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The catalog service (reads via coordinator, writes to store).
    catalog: Arc<CatalogService>,

    /// The cache coordinator, exposed for invalidation endpoints.
    coordinator: Arc<CacheCoordinator>,
}

impl AppState {
    /// Creates a new AppState with the given catalog and coordinator.
    pub fn new(catalog: Arc<CatalogService>, coordinator: Arc<CacheCoordinator>) -> Self {
        Self {
            catalog,
            coordinator,
        }
    }

    /// Returns a reference to the catalog service.
    pub fn catalog(&self) -> &CatalogService {
        self.catalog.as_ref()
    }

    /// Returns a reference to the cache coordinator.
    pub fn coordinator(&self) -> &CacheCoordinator {
        self.coordinator.as_ref()
    }
}
