//! Back-office catalog, orders and customers pages.
//!
//! Requires a running admin server and `ADMIN_TEST_EMAIL` /
//! `ADMIN_TEST_PASSWORD` for an `admin` account.

use reqwest::StatusCode;
use uuid::Uuid;

use mais_saude_integration_tests::{admin_base_url, admin_client, location};

#[tokio::test]
#[ignore = "Requires running admin server and test credentials"]
async fn test_product_lifecycle() {
    let client = admin_client().await;
    let base_url = admin_base_url();
    let slug = format!("teste-integracao-{}", Uuid::new_v4().simple());

    let resp = client
        .post(format!("{base_url}/products"))
        .form(&[
            ("name", "Produto de Teste"),
            ("slug", slug.as_str()),
            ("price", "19,90"),
            ("active", "on"),
        ])
        .send()
        .await
        .expect("Failed to create product");
    assert!(resp.status().is_redirection(), "got {}", resp.status());
    assert!(location(&resp).starts_with("/products?success="));

    let body = client
        .get(format!("{base_url}/products?q={slug}"))
        .send()
        .await
        .expect("Failed to search products")
        .text()
        .await
        .expect("Failed to read body");
    assert!(body.contains(&slug));
    assert!(body.contains("R$ 19,90"));

    // Same slug again is a conflict shown on the form.
    let resp = client
        .post(format!("{base_url}/products"))
        .form(&[("name", "Produto de Teste"), ("slug", slug.as_str())])
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
#[ignore = "Requires running admin server and test credentials"]
async fn test_invalid_price_rerenders_form() {
    let client = admin_client().await;

    let resp = client
        .post(format!("{}/products", admin_base_url()))
        .form(&[("name", "Preço Ruim"), ("price", "dezenove")])
        .send()
        .await
        .expect("Failed to create product");

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains("Preço Ruim"));
}

#[tokio::test]
#[ignore = "Requires running admin server and test credentials"]
async fn test_orders_filter_and_unknown_order() {
    let client = admin_client().await;
    let base_url = admin_base_url();

    let resp = client
        .get(format!("{base_url}/orders?status=pending"))
        .send()
        .await
        .expect("Failed to list orders");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/orders/{}", Uuid::new_v4()))
        .send()
        .await
        .expect("Failed to get order");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running admin server and test credentials"]
async fn test_customer_search() {
    let client = admin_client().await;

    let resp = client
        .get(format!("{}/customers?q=zzz-ninguem-com-esse-nome", admin_base_url()))
        .send()
        .await
        .expect("Failed to search customers");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains("Nenhum cliente encontrado."));
}
