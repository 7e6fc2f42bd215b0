//! Product listing pipeline: filter → sort → paginate.
//!
//! [`execute`] is a pure function over a [`Catalog`]; it holds no state and is
//! safe to call from concurrent requests.
//!
//! Facets (`availableTags`, `availableCategories`) are always computed over
//! the whole catalog, so they stay stable while filters are applied.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Category, Product};

/// Page used when the request does not name one.
pub const DEFAULT_PAGE: i64 = 1;
/// Page size used when the request does not name one.
pub const DEFAULT_LIMIT: i64 = 12;
/// Largest page size a request may ask for.
pub const MAX_LIMIT: i64 = 50;

/// Errors raised by the query pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// Pagination parameters out of range or not numeric.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

/// Sort orders understood by the listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
    Newest,
}

impl SortKey {
    /// Parse from the URL parameter value. Unknown values yield `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "price_asc" => Some(Self::PriceAsc),
            "price_desc" => Some(Self::PriceDesc),
            "name_asc" => Some(Self::NameAsc),
            "name_desc" => Some(Self::NameDesc),
            "newest" => Some(Self::Newest),
            _ => None,
        }
    }

    /// Convert to URL parameter value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::NameAsc => "name_asc",
            Self::NameDesc => "name_desc",
            Self::Newest => "newest",
        }
    }
}

/// Raw listing parameters exactly as they arrive in the query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    /// Comma-separated tag list.
    pub tags: Option<String>,
    /// Comma-separated category slug list.
    pub categories: Option<String>,
    pub sort: Option<String>,
    pub search: Option<String>,
}

/// A validated-on-execute product query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub search: String,
    pub sort: Option<SortKey>,
    pub page: i64,
    pub limit: i64,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            tags: Vec::new(),
            categories: Vec::new(),
            search: String::new(),
            sort: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .filter(|part| !part.is_empty())
            .map(str::to_owned)
            .collect()
    })
    .unwrap_or_default()
}

fn parse_number(raw: Option<&str>, default: i64, name: &str) -> Result<i64, QueryError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(s) => s
            .parse::<i64>()
            .map_err(|_| QueryError::InvalidQuery(format!("{name} must be an integer"))),
    }
}

impl ProductQuery {
    /// Build a query from raw query-string parameters.
    ///
    /// An unknown `sort` value is kept as "no sort"; range checks happen in
    /// [`ProductQuery::validate`].
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidQuery`] if `page` or `limit` is not an integer.
    pub fn from_params(params: &ListingParams) -> Result<Self, QueryError> {
        Ok(Self {
            tags: split_list(params.tags.as_deref()),
            categories: split_list(params.categories.as_deref()),
            search: params.search.clone().unwrap_or_default(),
            sort: params.sort.as_deref().and_then(SortKey::parse),
            page: parse_number(params.page.as_deref(), DEFAULT_PAGE, "page")?,
            limit: parse_number(params.limit.as_deref(), DEFAULT_LIMIT, "limit")?,
        })
    }

    /// Convert back to query-string parameters, as the CLI client sends them.
    #[must_use]
    pub fn to_params(&self) -> ListingParams {
        let join = |items: &[String]| (!items.is_empty()).then(|| items.join(","));
        ListingParams {
            page: Some(self.page.to_string()),
            limit: Some(self.limit.to_string()),
            tags: join(&self.tags),
            categories: join(&self.categories),
            sort: self.sort.map(|s| s.as_str().to_owned()),
            search: (!self.search.is_empty()).then(|| self.search.clone()),
        }
    }

    /// Check pagination bounds: `page >= 1` and `1 <= limit <= 50`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidQuery`] when either bound is violated.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.page < 1 {
            return Err(QueryError::InvalidQuery("page must be at least 1".into()));
        }
        if !(1..=MAX_LIMIT).contains(&self.limit) {
            return Err(QueryError::InvalidQuery(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        Ok(())
    }
}

/// Pagination metadata for one page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total: usize,
    pub total_pages: usize,
    pub current_page: i64,
    pub limit: i64,
    pub has_more: bool,
}

/// Filter values available over the whole catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facets {
    pub available_tags: Vec<String>,
    pub available_categories: Vec<Category>,
}

/// One page of the product listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub pagination: PageInfo,
    pub filters: Facets,
}

/// Run the full pipeline.
///
/// # Errors
///
/// Returns [`QueryError::InvalidQuery`] if the pagination bounds are violated.
/// Validation happens before any filtering.
pub fn execute(catalog: &Catalog, query: &ProductQuery) -> Result<ProductPage, QueryError> {
    query.validate()?;

    let filtered = filter_products(&catalog.products, query);
    let sorted = sort_products(filtered, query.sort);
    let (products, pagination) = paginate(&sorted, query.page, query.limit);

    Ok(ProductPage {
        products: products.into_iter().cloned().collect(),
        pagination,
        filters: facets(catalog),
    })
}

/// Apply the tag, category and search filters in that order.
#[must_use]
pub fn filter_products<'a>(products: &'a [Product], query: &ProductQuery) -> Vec<&'a Product> {
    let needle = query.search.to_lowercase();

    products
        .iter()
        .filter(|p| query.tags.is_empty() || query.tags.iter().any(|t| p.tags.contains(t)))
        .filter(|p| {
            query.categories.is_empty()
                || query
                    .categories
                    .iter()
                    .any(|slug| p.categories.iter().any(|c| &c.slug == slug))
        })
        .filter(|p| needle.is_empty() || matches_search(p, &needle))
        .collect()
}

fn matches_search(product: &Product, needle: &str) -> bool {
    product.name.to_lowercase().contains(needle)
        || product.description.to_lowercase().contains(needle)
        || product
            .short_description
            .as_deref()
            .is_some_and(|s| s.to_lowercase().contains(needle))
}

/// Stable sort by the requested key. `None` keeps the incoming order.
#[must_use]
pub fn sort_products(mut products: Vec<&Product>, sort: Option<SortKey>) -> Vec<&Product> {
    match sort {
        Some(SortKey::PriceAsc) => products.sort_by(|a, b| a.base_price.cmp(&b.base_price)),
        Some(SortKey::PriceDesc) => products.sort_by(|a, b| b.base_price.cmp(&a.base_price)),
        Some(SortKey::NameAsc) => products.sort_by(|a, b| compare_names(&a.name, &b.name)),
        Some(SortKey::NameDesc) => products.sort_by(|a, b| compare_names(&b.name, &a.name)),
        Some(SortKey::Newest) => products.sort_by(|a, b| compare_newest(a, b)),
        None => {}
    }
    products
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Later publication first; unparseable or missing timestamps last.
fn compare_newest(a: &Product, b: &Product) -> Ordering {
    match (published(a), published(b)) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn published(product: &Product) -> Option<DateTime<Utc>> {
    let raw = product.published_at.as_deref()?.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
}

/// Cut one page out of `items`. `page` and `limit` must already be validated.
#[must_use]
pub fn paginate<T: Clone>(items: &[T], page: i64, limit: i64) -> (Vec<T>, PageInfo) {
    let limit_len = usize::try_from(limit).unwrap_or(0).max(1);
    let page_index = usize::try_from(page.saturating_sub(1)).unwrap_or(0);
    let start = page_index.saturating_mul(limit_len);
    let end = start.saturating_add(limit_len);
    let total = items.len();

    let slice = items
        .get(start.min(total)..end.min(total))
        .map(<[T]>::to_vec)
        .unwrap_or_default();

    let info = PageInfo {
        total,
        total_pages: total.div_ceil(limit_len),
        current_page: page,
        limit,
        has_more: end < total,
    };
    (slice, info)
}

/// Distinct tags in first-seen order plus the catalog's category list.
#[must_use]
pub fn facets(catalog: &Catalog) -> Facets {
    let mut seen = HashSet::new();
    let available_tags = catalog
        .products
        .iter()
        .flat_map(|p| p.tags.iter())
        .filter(|tag| seen.insert(tag.as_str()))
        .cloned()
        .collect();

    Facets {
        available_tags,
        available_categories: catalog.categories.clone(),
    }
}
