//! Product route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use atelier_core::catalog::Product;
use atelier_core::query::{self, ListingParams, ProductPage, ProductQuery};

use super::ApiQuery;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Number of related products shown on a product page.
const RELATED_LIMIT: usize = 4;

/// Product detail response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub product: Product,
    pub related_products: Vec<Product>,
}

/// Product listing.
///
/// GET /api/products?page&limit&tags&categories&sort&search
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListingParams>,
) -> Result<Json<ProductPage>> {
    let query = ProductQuery::from_params(&params)?;
    let catalog = state.catalog().load().await?;
    let page = query::execute(&catalog, &query)?;

    tracing::debug!(
        total = page.pagination.total,
        returned = page.products.len(),
        "Products listed"
    );
    Ok(Json(page))
}

/// Product detail with related products.
///
/// GET /api/products/{slug}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductDetail>> {
    let catalog = state.catalog().load().await?;
    let product = catalog
        .find_by_slug(&slug)
        .ok_or_else(|| AppError::NotFound("Product".to_owned()))?;

    let related_products = catalog.related_products(product, RELATED_LIMIT);
    Ok(Json(ProductDetail {
        product: product.clone(),
        related_products,
    }))
}
