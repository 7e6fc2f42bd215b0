//! Versioned product catalog schema.
//!
//! The catalog is a single JSON document:
//!
//! ```json
//! {
//!   "version": 1,
//!   "products": [ { "id": "p1", "slug": "linen-shirt", ... } ],
//!   "categories": [ { "id": "c1", "name": "Shirts", "slug": "shirts" } ]
//! }
//! ```
//!
//! It is parsed and validated at the store boundary with
//! [`Catalog::from_json`]; everything downstream works on typed products.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Price, ProductId, Size};

/// Catalog schema version understood by this build.
pub const CATALOG_SCHEMA_VERSION: u32 = 1;

const fn default_version() -> u32 {
    CATALOG_SCHEMA_VERSION
}

/// Errors raised while reading a catalog document.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The document is not valid JSON or does not match the schema.
    #[error("malformed catalog: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The document declares a schema version this build cannot read.
    #[error("unsupported catalog version {found} (supported: {supported})")]
    UnsupportedVersion {
        /// Version found in the document.
        found: u32,
        /// Version this build reads.
        supported: u32,
    },

    /// A product violates a schema constraint.
    #[error("invalid product {id}: {reason}")]
    InvalidProduct {
        /// Offending product id (may be empty).
        id: String,
        /// Violated constraint.
        reason: String,
    },

    /// Two products share the same id.
    #[error("duplicate product id: {0}")]
    DuplicateProduct(ProductId),

    /// Two products share the same URL slug.
    #[error("duplicate product slug: {0}")]
    DuplicateSlug(String),
}

/// A product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub url: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_main: Option<bool>,
}

/// A product category, both as catalog entry and as product classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    pub base_price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<Price>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    /// Size options on offer.
    #[serde(default, rename = "size")]
    pub sizes: Vec<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_reviews: Option<u32>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Publication timestamp as written in the catalog (RFC 3339 or `YYYY-MM-DD`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

impl Product {
    /// URL of the first image, if any.
    #[must_use]
    pub fn primary_image_url(&self) -> Option<&str> {
        self.images.first().map(|image| image.url.as_str())
    }

    /// Whether any of the product's categories has the given id.
    #[must_use]
    pub fn in_category(&self, id: &CategoryId) -> bool {
        self.categories.iter().any(|c| &c.id == id)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |reason: &str| CatalogError::InvalidProduct {
            id: self.id.to_string(),
            reason: reason.to_owned(),
        };

        if self.id.as_str().trim().is_empty() {
            return Err(invalid("id cannot be empty"));
        }
        if self.slug.trim().is_empty() {
            return Err(invalid("slug cannot be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(invalid("name cannot be empty"));
        }
        if self.base_price.is_negative() {
            return Err(invalid("basePrice cannot be negative"));
        }
        if self.compare_at_price.is_some_and(|p| p.is_negative()) {
            return Err(invalid("compareAtPrice cannot be negative"));
        }
        Ok(())
    }
}

/// A catalog category together with how many products carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    #[serde(flatten)]
    pub category: Category,
    pub product_count: usize,
}

/// The full product catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Catalog {
    /// Build a catalog at the current schema version.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if any product violates the schema.
    pub fn new(products: Vec<Product>, categories: Vec<Category>) -> Result<Self, CatalogError> {
        let catalog = Self {
            version: CATALOG_SCHEMA_VERSION,
            products,
            categories,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse and validate a catalog document.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Malformed`] for invalid JSON,
    /// [`CatalogError::UnsupportedVersion`] for a foreign schema version, and
    /// [`CatalogError::InvalidProduct`], [`CatalogError::DuplicateProduct`] or
    /// [`CatalogError::DuplicateSlug`] when a product breaks a constraint.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check the schema version and every product.
    ///
    /// # Errors
    ///
    /// See [`Catalog::from_json`].
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.version != CATALOG_SCHEMA_VERSION {
            return Err(CatalogError::UnsupportedVersion {
                found: self.version,
                supported: CATALOG_SCHEMA_VERSION,
            });
        }

        let mut ids = HashSet::with_capacity(self.products.len());
        let mut slugs = HashSet::with_capacity(self.products.len());
        for product in &self.products {
            product.validate()?;
            if !ids.insert(&product.id) {
                return Err(CatalogError::DuplicateProduct(product.id.clone()));
            }
            if !slugs.insert(product.slug.as_str()) {
                return Err(CatalogError::DuplicateSlug(product.slug.clone()));
            }
        }
        Ok(())
    }

    /// Find a product by its URL slug.
    #[must_use]
    pub fn find_by_slug(&self, slug: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.slug == slug)
    }

    /// Find a product by id.
    #[must_use]
    pub fn find_by_id(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Products sharing a category with `product`, at most `limit` of them.
    ///
    /// Categories are visited in the product's own order and every other
    /// product of each category is appended, so a product sharing two
    /// categories can appear twice.
    #[must_use]
    pub fn related_products(&self, product: &Product, limit: usize) -> Vec<Product> {
        product
            .categories
            .iter()
            .flat_map(|category| {
                self.products
                    .iter()
                    .filter(move |p| p.id != product.id && p.in_category(&category.id))
            })
            .take(limit)
            .cloned()
            .collect()
    }

    /// Every catalog category with its product count.
    #[must_use]
    pub fn category_summaries(&self) -> Vec<CategorySummary> {
        self.categories
            .iter()
            .map(|category| CategorySummary {
                category: category.clone(),
                product_count: self
                    .products
                    .iter()
                    .filter(|p| p.in_category(&category.id))
                    .count(),
            })
            .collect()
    }

    /// The summary of one category, looked up by slug.
    #[must_use]
    pub fn category_summary(&self, slug: &str) -> Option<CategorySummary> {
        self.category_summaries()
            .into_iter()
            .find(|summary| summary.category.slug == slug)
    }
}

/// Test fixtures shared by the core test modules.
#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn category(id: &str) -> Category {
        Category {
            id: CategoryId::from(id),
            name: id.to_uppercase(),
            slug: id.to_owned(),
        }
    }

    pub fn product(id: &str, price: i64) -> Product {
        Product {
            id: ProductId::from(id),
            slug: format!("{id}-slug"),
            name: format!("Product {id}"),
            description: String::new(),
            short_description: None,
            base_price: Price::from_units(price),
            compare_at_price: None,
            images: vec![ProductImage {
                url: format!("/img/{id}.jpg"),
                alt: id.to_owned(),
                is_main: Some(true),
            }],
            sizes: vec![Size::from(8), Size::from(9)],
            average_rating: None,
            total_reviews: None,
            categories: Vec::new(),
            tags: Vec::new(),
            published_at: None,
        }
    }
}
