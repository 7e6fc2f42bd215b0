//! Product catalog sources.
//!
//! The catalog is read-only for the storefront. [`JsonCatalog`] re-reads
//! `products.json` on every request so catalog edits show up without a
//! restart; [`StaticCatalog`] serves a fixed in-memory catalog.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use atelier_core::catalog::{Catalog, CatalogError};

/// File name of the catalog inside the data directory.
pub const CATALOG_FILE: &str = "products.json";

/// Errors raised while loading the catalog.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Invalid(#[from] CatalogError),
}

/// Where the storefront gets its products from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Load and validate the current catalog.
    async fn load(&self) -> Result<Catalog, CatalogLoadError>;
}

/// Catalog read from a JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    path: PathBuf,
}

impl JsonCatalog {
    /// Read the catalog from `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read `products.json` from a data directory.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(CATALOG_FILE))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CatalogSource for JsonCatalog {
    async fn load(&self) -> Result<Catalog, CatalogLoadError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| CatalogLoadError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(Catalog::from_json(&raw)?)
    }
}

/// A fixed catalog held in memory.
#[derive(Debug, Clone)]
pub struct StaticCatalog(Arc<Catalog>);

impl StaticCatalog {
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self(Arc::new(catalog))
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn load(&self) -> Result<Catalog, CatalogLoadError> {
        Ok(Catalog::clone(&self.0))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonCatalog::in_dir(dir.path());
        assert!(matches!(
            source.load().await,
            Err(CatalogLoadError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn test_loads_valid_document() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CATALOG_FILE),
            r#"{
                "products": [
                    {"id": "p1", "slug": "linen-shirt", "name": "Linen Shirt", "basePrice": 49.5, "size": [8, 9]}
                ],
                "categories": [{"id": "c1", "name": "Shirts", "slug": "shirts"}]
            }"#,
        )
        .unwrap();

        let catalog = JsonCatalog::in_dir(dir.path()).load().await.unwrap();
        assert_eq!(catalog.products.len(), 1);
        assert_eq!(catalog.categories.len(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_version_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CATALOG_FILE),
            r#"{"version": 2, "products": [], "categories": []}"#,
        )
        .unwrap();

        assert!(matches!(
            JsonCatalog::in_dir(dir.path()).load().await,
            Err(CatalogLoadError::Invalid(CatalogError::UnsupportedVersion { .. }))
        ));
    }
}
