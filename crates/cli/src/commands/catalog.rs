//! Catalog browsing commands.

use std::path::Path;

use atelier_core::catalog::Catalog;
use atelier_core::query::{ListingParams, ProductQuery};

use super::{CommandResult, Context, print_json, print_lines};

/// `atelier products` - one page of the listing.
///
/// Pagination is checked before any request is made.
pub async fn products(ctx: &Context, params: &ListingParams) -> CommandResult {
    let query = ProductQuery::from_params(params)?;
    query.validate()?;
    let page = ctx.api.list_products(&query).await?;

    let info = &page.pagination;
    let mut lines: Vec<String> = page
        .products
        .iter()
        .map(|p| format!("{:<32} {:>10}  {}", p.slug, p.base_price.to_string(), p.name))
        .collect();
    lines.push(format!(
        "page {}/{} ({} products{})",
        info.current_page,
        info.total_pages,
        info.total,
        if info.has_more { ", more available" } else { "" }
    ));
    print_lines(lines)
}

/// `atelier product <slug>` - full product detail as JSON.
pub async fn product(ctx: &Context, slug: &str) -> CommandResult {
    let detail = ctx.api.product(slug).await?;
    print_json(&detail.product)?;

    if !detail.related_products.is_empty() {
        print_lines(
            std::iter::once("Related:".to_owned()).chain(
                detail
                    .related_products
                    .iter()
                    .map(|p| format!("  {} ({})", p.name, p.slug)),
            ),
        )?;
    }
    Ok(())
}

/// `atelier categories`
pub async fn categories(ctx: &Context) -> CommandResult {
    let categories = ctx.api.categories().await?;
    print_lines(
        categories
            .iter()
            .map(|c| format!("{:<24} {:>4}  {}", c.category.slug, c.product_count, c.category.name)),
    )
}

/// `atelier catalog validate <path>` - check a catalog file offline.
pub fn validate(path: &Path) -> CommandResult {
    let raw = std::fs::read_to_string(path)?;
    let catalog = Catalog::from_json(&raw)?;
    print_lines([format!(
        "{}: {} products, {} categories, ok",
        path.display(),
        catalog.products.len(),
        catalog.categories.len()
    )])
}
