//! Product listing, product detail and category endpoints.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use atelier_integration_tests::TestApp;
use axum::http::StatusCode;
use serde_json::Value;

fn slugs(body: &Value) -> Vec<String> {
    body["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["slug"].as_str().unwrap().to_owned())
        .collect()
}

fn prices(body: &Value) -> Vec<f64> {
    body["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["basePrice"].as_f64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_default_listing() {
    let app = TestApp::new();
    let response = app.get("/api/products").await;

    assert_eq!(response.status, StatusCode::OK);
    let pagination = &response.body["pagination"];
    assert_eq!(pagination["total"], 8);
    assert_eq!(pagination["totalPages"], 1);
    assert_eq!(pagination["currentPage"], 1);
    assert_eq!(pagination["limit"], 12);
    assert_eq!(pagination["hasMore"], false);
    assert_eq!(slugs(&response.body).len(), 8);
}

#[tokio::test]
async fn test_facets_ignore_filters() {
    let app = TestApp::new();
    let response = app.get("/api/products?tags=silk").await;

    let filters = &response.body["filters"];
    assert_eq!(filters["availableCategories"].as_array().unwrap().len(), 4);
    let tags: Vec<&str> = filters["availableTags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t.as_str().unwrap())
        .collect();
    assert_eq!(
        &tags[..5],
        &["leather", "classic", "bestseller", "canvas", "summer"]
    );
    assert_eq!(tags.len(), 14);
}

#[tokio::test]
async fn test_tag_filter_keeps_only_matching_products() {
    let app = TestApp::new();
    let response = app.get("/api/products?tags=summer,silk").await;

    assert_eq!(response.status, StatusCode::OK);
    for product in response.body["products"].as_array().unwrap() {
        let tags = product["tags"].as_array().unwrap();
        assert!(tags.iter().any(|t| t == "summer" || t == "silk"), "{product}");
    }
    assert_eq!(
        slugs(&response.body),
        ["canvas-low-top", "linen-shirt", "silk-scarf"]
    );
}

#[tokio::test]
async fn test_category_and_search_filters() {
    let app = TestApp::new();

    let shirts = app.get("/api/products?categories=shirts").await;
    assert_eq!(
        slugs(&shirts.body),
        ["linen-shirt", "oxford-button-down", "denim-jacket"]
    );

    let search = app.get("/api/products?search=LINEN").await;
    assert_eq!(slugs(&search.body), ["linen-shirt"]);

    let by_short_description = app.get("/api/products?search=daily%20miles").await;
    assert_eq!(slugs(&by_short_description.body), ["running-trainer"]);
}

#[tokio::test]
async fn test_no_matches_is_an_empty_page() {
    let app = TestApp::new();
    let response = app.get("/api/products?search=tuxedo").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(slugs(&response.body).is_empty());
    assert_eq!(response.body["pagination"]["total"], 0);
    assert_eq!(response.body["pagination"]["totalPages"], 0);
    assert_eq!(response.body["pagination"]["hasMore"], false);
}

#[tokio::test]
async fn test_pages_partition_the_results() {
    let app = TestApp::new();
    let mut seen = Vec::new();

    for page in 1..=3 {
        let response = app
            .get(&format!("/api/products?limit=3&page={page}&sort=name_asc"))
            .await;
        assert_eq!(response.body["pagination"]["totalPages"], 3);
        assert_eq!(response.body["pagination"]["hasMore"], page < 3);
        seen.extend(slugs(&response.body));
    }

    let all = app.get("/api/products?sort=name_asc").await;
    assert_eq!(seen, slugs(&all.body));

    let beyond = app.get("/api/products?limit=3&page=5").await;
    assert!(slugs(&beyond.body).is_empty());
    assert_eq!(beyond.body["pagination"]["currentPage"], 5);
}

#[tokio::test]
async fn test_price_sorts_are_reverses() {
    let app = TestApp::new();
    let asc = prices(&app.get("/api/products?sort=price_asc").await.body);
    let mut desc = prices(&app.get("/api/products?sort=price_desc").await.body);

    assert_eq!(asc, [25.0, 40.0, 55.0, 65.0, 85.0, 95.0, 120.0, 310.0]);
    desc.reverse();
    assert_eq!(asc, desc);
}

#[tokio::test]
async fn test_name_sort_ignores_case() {
    let app = TestApp::new();
    let response = app.get("/api/products?sort=name_asc").await;
    let slugs = slugs(&response.body);

    assert_eq!(slugs[5], "running-trainer");
    assert_eq!(slugs.first().unwrap(), "canvas-low-top");
    assert_eq!(slugs.last().unwrap(), "wool-overcoat");
}

#[tokio::test]
async fn test_newest_puts_undated_last() {
    let app = TestApp::new();
    let response = app.get("/api/products?sort=newest").await;
    assert_eq!(
        slugs(&response.body),
        [
            "running-trainer",
            "canvas-low-top",
            "classic-leather-sneaker",
            "wool-overcoat",
            "linen-shirt",
            "oxford-button-down",
            "denim-jacket",
            "silk-scarf",
        ]
    );
}

#[tokio::test]
async fn test_unknown_sort_keeps_catalog_order() {
    let app = TestApp::new();
    let sorted = app.get("/api/products?sort=popularity").await;
    let unsorted = app.get("/api/products").await;
    assert_eq!(slugs(&sorted.body), slugs(&unsorted.body));
}

#[tokio::test]
async fn test_invalid_pagination_is_rejected() {
    let app = TestApp::new();
    for query in ["limit=0", "limit=51", "page=0", "page=-2", "page=abc", "limit=ten"] {
        let response = app.get(&format!("/api/products?{query}")).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{query}");
        assert_eq!(response.error(), Some("Invalid pagination parameters"));
    }

    let max = app.get("/api/products?limit=50").await;
    assert_eq!(max.status, StatusCode::OK);
}

#[tokio::test]
async fn test_product_detail_with_related() {
    let app = TestApp::new();
    let response = app.get("/api/products/denim-jacket").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["product"]["name"], "Denim Jacket");
    let related: Vec<&str> = response.body["relatedProducts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["slug"].as_str().unwrap())
        .collect();
    assert_eq!(related, ["wool-overcoat", "linen-shirt", "oxford-button-down"]);
}

#[tokio::test]
async fn test_unknown_product_is_404() {
    let app = TestApp::new();
    let response = app.get("/api/products/ball-gown").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error(), Some("Product not found"));
}

#[tokio::test]
async fn test_categories_with_counts() {
    let app = TestApp::new();
    let response = app.get("/api/categories").await;

    assert_eq!(response.status, StatusCode::OK);
    let counts: Vec<(String, u64)> = response.body["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| {
            (
                c["slug"].as_str().unwrap().to_owned(),
                c["productCount"].as_u64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        counts,
        [
            ("sneakers".to_owned(), 3),
            ("shirts".to_owned(), 3),
            ("outerwear".to_owned(), 2),
            ("accessories".to_owned(), 1),
        ]
    );
}

#[tokio::test]
async fn test_single_category() {
    let app = TestApp::new();

    let outerwear = app.get("/api/categories/outerwear").await;
    assert_eq!(outerwear.status, StatusCode::OK);
    assert_eq!(outerwear.body["id"], "cat-outerwear");
    assert_eq!(outerwear.body["name"], "Outerwear");
    assert_eq!(outerwear.body["productCount"], 2);

    let missing = app.get("/api/categories/swimwear").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}
