//! Catalog pages and the JSON API.
//!
//! Requires a running storefront with a seeded catalog.

use reqwest::StatusCode;
use serde_json::Value;

use mais_saude_integration_tests::{client, storefront_base_url};

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_health() {
    let resp = client()
        .get(format!("{}/health", storefront_base_url()))
        .send()
        .await
        .expect("Failed to reach storefront");

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_home_sets_security_headers() {
    let resp = client()
        .get(storefront_base_url())
        .send()
        .await
        .expect("Failed to get home page");

    assert_eq!(resp.status(), StatusCode::OK);
    let csp = resp
        .headers()
        .get("content-security-policy")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    assert!(csp.contains("nonce-"), "CSP without nonce: {csp}");
    assert!(csp.contains("https://wa.me"));

    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains("wa.me/"));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_unknown_product_is_404() {
    let resp = client()
        .get(format!("{}/products/nao-existe-mesmo", storefront_base_url()))
        .send()
        .await
        .expect("Failed to get product page");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_search_fragment_needs_two_characters() {
    let resp = client()
        .get(format!("{}/search?q=a", storefront_base_url()))
        .send()
        .await
        .expect("Failed to search");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read body");
    assert!(!body.contains("<li"));
}

#[tokio::test]
#[ignore = "Requires running storefront server with seeded catalog"]
async fn test_api_products_are_active_and_linked() {
    let base_url = storefront_base_url();
    let client = client();

    let products: Vec<Value> = client
        .get(format!("{base_url}/api/products"))
        .send()
        .await
        .expect("Failed to list products")
        .json()
        .await
        .expect("Invalid JSON");

    assert!(!products.is_empty(), "Seed the catalog first");
    for product in &products {
        assert_eq!(product["active"], Value::Bool(true));
    }

    let slug = products[0]["slug"].as_str().expect("product without slug");
    let resp = client
        .get(format!("{base_url}/api/products/{slug}"))
        .send()
        .await
        .expect("Failed to get product");
    assert_eq!(resp.status(), StatusCode::OK);
    let product: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(product["slug"], slug);
    assert!(product["images"].is_array());
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_api_testimonial_validation() {
    let client = client();
    let url = format!("{}/api/testimonials", storefront_base_url());

    let resp = client
        .post(&url)
        .json(&serde_json::json!({
            "customer_name": "Maria",
            "rating": 6,
            "comment": "Ótimo atendimento!"
        }))
        .send()
        .await
        .expect("Failed to post testimonial");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .post(&url)
        .json(&serde_json::json!({
            "customer_name": "Maria",
            "rating": 5,
            "comment": "Ótimo atendimento!"
        }))
        .send()
        .await
        .expect("Failed to post testimonial");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body["testimonial"]["active"], Value::Bool(false));
}
