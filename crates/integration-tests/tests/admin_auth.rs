//! Back-office access control.
//!
//! Requires a running admin server; the signed-in tests also need
//! `ADMIN_TEST_EMAIL` and `ADMIN_TEST_PASSWORD` for an `admin` account.

use reqwest::StatusCode;

use mais_saude_integration_tests::{admin_base_url, admin_client, client, location};

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_pages_require_login() {
    let client = client();
    for path in ["/", "/products", "/orders", "/customers", "/testimonials", "/settings"] {
        let resp = client
            .get(format!("{}{path}", admin_base_url()))
            .send()
            .await
            .expect("Failed to reach admin");

        assert!(resp.status().is_redirection(), "{path}: {}", resp.status());
        assert_eq!(location(&resp), "/auth/login", "{path}");
    }
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_wrong_password_is_401() {
    let resp = client()
        .post(format!("{}/auth/login", admin_base_url()))
        .form(&[
            ("email", "ninguem@maissaude.com.br"),
            ("password", "senha-totalmente-errada"),
        ])
        .send()
        .await
        .expect("Failed to post login");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_login_page_headers() {
    let resp = client()
        .get(format!("{}/auth/login", admin_base_url()))
        .send()
        .await
        .expect("Failed to get login page");

    assert_eq!(resp.status(), StatusCode::OK);
    let headers = resp.headers();
    assert_eq!(
        headers.get("x-frame-options").and_then(|v| v.to_str().ok()),
        Some("DENY")
    );
    assert_eq!(
        headers.get("cache-control").and_then(|v| v.to_str().ok()),
        Some("no-store")
    );
}

#[tokio::test]
#[ignore = "Requires running admin server and test credentials"]
async fn test_admin_cannot_change_settings() {
    let client = admin_client().await;

    let resp = client
        .post(format!("{}/settings", admin_base_url()))
        .form(&[
            ("store_name", "Outra Farmácia"),
            ("whatsapp_number", "75991357869"),
            ("primary_color", "#16a34a"),
        ])
        .send()
        .await
        .expect("Failed to post settings");

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running admin server and test credentials"]
async fn test_logout_ends_session() {
    let client = admin_client().await;
    let base_url = admin_base_url();

    let resp = client
        .get(format!("{base_url}/"))
        .send()
        .await
        .expect("Failed to get dashboard");
    assert_eq!(resp.status(), StatusCode::OK);

    client
        .post(format!("{base_url}/auth/logout"))
        .send()
        .await
        .expect("Failed to log out");

    let resp = client
        .get(format!("{base_url}/"))
        .send()
        .await
        .expect("Failed to get dashboard");
    assert_eq!(location(&resp), "/auth/login");
}
