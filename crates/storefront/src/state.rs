//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::{CatalogSource, JsonCatalog};
use crate::config::StorefrontConfig;
use crate::db::{DocumentStore, JsonFileStore};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the record store, the catalog and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    store: Arc<dyn DocumentStore>,
    catalog: Arc<dyn CatalogSource>,
}

impl AppState {
    /// Create a new application state from explicit backends.
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        store: Arc<dyn DocumentStore>,
        catalog: Arc<dyn CatalogSource>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                catalog,
            }),
        }
    }

    /// State backed by the JSON files in `config.data_dir`.
    #[must_use]
    pub fn from_data_dir(config: StorefrontConfig) -> Self {
        let store = Arc::new(JsonFileStore::new(&config.data_dir));
        let catalog = Arc::new(JsonCatalog::in_dir(&config.data_dir));
        Self::new(config, store, catalog)
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the record store.
    #[must_use]
    pub fn store(&self) -> &dyn DocumentStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the catalog source.
    #[must_use]
    pub fn catalog(&self) -> &dyn CatalogSource {
        self.inner.catalog.as_ref()
    }
}
