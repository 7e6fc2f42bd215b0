//! Category route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use atelier_core::catalog::CategorySummary;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Category listing response.
#[derive(Debug, Serialize)]
pub struct CategoryList {
    pub categories: Vec<CategorySummary>,
}

/// Every category with its product count.
///
/// GET /api/categories
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<CategoryList>> {
    let catalog = state.catalog().load().await?;
    Ok(Json(CategoryList {
        categories: catalog.category_summaries(),
    }))
}

/// One category by slug.
///
/// GET /api/categories/{slug}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CategorySummary>> {
    let catalog = state.catalog().load().await?;
    catalog
        .category_summary(&slug)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Category".to_owned()))
}
