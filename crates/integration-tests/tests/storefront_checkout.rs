//! Cart and WhatsApp checkout flow.
//!
//! Requires a running storefront with at least one active product.

use reqwest::StatusCode;
use serde_json::Value;

use mais_saude_integration_tests::{client, location, storefront_base_url};

async fn first_product_id(client: &reqwest::Client) -> String {
    let products: Vec<Value> = client
        .get(format!("{}/api/products", storefront_base_url()))
        .send()
        .await
        .expect("Failed to list products")
        .json()
        .await
        .expect("Invalid JSON");

    products
        .first()
        .and_then(|p| p["id"].as_str())
        .expect("Seed the catalog first")
        .to_owned()
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_checkout_with_empty_cart_goes_back_to_cart() {
    let resp = client()
        .get(format!("{}/checkout", storefront_base_url()))
        .send()
        .await
        .expect("Failed to get checkout");

    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/cart");
}

#[tokio::test]
#[ignore = "Requires running storefront server with seeded catalog"]
async fn test_add_to_cart_updates_count() {
    let base_url = storefront_base_url();
    let client = client();
    let product_id = first_product_id(&client).await;

    let resp = client
        .post(format!("{base_url}/cart/add"))
        .form(&[("product_id", product_id.as_str()), ("quantity", "2")])
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("hx-trigger"));

    let count = client
        .get(format!("{base_url}/cart/count"))
        .send()
        .await
        .expect("Failed to get count")
        .text()
        .await
        .expect("Failed to read body");
    assert!(count.contains('2'), "unexpected badge: {count}");
}

#[tokio::test]
#[ignore = "Requires running storefront server with seeded catalog"]
async fn test_checkout_redirects_to_whatsapp_and_clears_cart() {
    let base_url = storefront_base_url();
    let client = client();
    let product_id = first_product_id(&client).await;

    client
        .post(format!("{base_url}/cart/add"))
        .form(&[("product_id", product_id.as_str())])
        .send()
        .await
        .expect("Failed to add to cart");

    let resp = client
        .post(format!("{base_url}/checkout"))
        .form(&[
            ("name", "Teste Integração"),
            ("phone", "(75) 99135-7869"),
            ("address", "Rua do Comércio, 45"),
            ("neighborhood", "Centro"),
            ("notes", "Pedido de teste, favor ignorar"),
        ])
        .send()
        .await
        .expect("Failed to submit checkout");

    assert!(resp.status().is_redirection(), "got {}", resp.status());
    let target = location(&resp);
    assert!(target.starts_with("https://wa.me/"), "unexpected target {target}");
    assert!(target.contains("?text="));

    let resp = client
        .get(format!("{base_url}/checkout"))
        .send()
        .await
        .expect("Failed to get checkout");
    assert_eq!(location(&resp), "/cart");
}

#[tokio::test]
#[ignore = "Requires running storefront server with seeded catalog"]
async fn test_checkout_rejects_bad_phone() {
    let base_url = storefront_base_url();
    let client = client();
    let product_id = first_product_id(&client).await;

    client
        .post(format!("{base_url}/cart/add"))
        .form(&[("product_id", product_id.as_str())])
        .send()
        .await
        .expect("Failed to add to cart");

    let resp = client
        .post(format!("{base_url}/checkout"))
        .form(&[
            ("name", "Teste"),
            ("phone", "1234"),
            ("address", "Rua A, 1"),
        ])
        .send()
        .await
        .expect("Failed to submit checkout");

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
