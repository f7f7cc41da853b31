//! Integration tests for Mais Saúde.
//!
//! The tests talk HTTP to running servers and are `#[ignore]`d by default.
//!
//! # Running Tests
//!
//! ```bash
//! ms-cli migrate all
//! ms-cli seed catalog data/catalogo.yaml
//! MS_ADMIN_PASSWORD='...' ms-cli admin create -e teste@maissaude.com.br -n Teste -r admin
//! cargo run -p mais-saude-storefront &
//! cargo run -p mais-saude-admin &
//!
//! ADMIN_TEST_EMAIL=teste@maissaude.com.br ADMIN_TEST_PASSWORD='...' \
//!     cargo test -p mais-saude-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - default `http://localhost:3000`
//! - `ADMIN_BASE_URL` - default `http://localhost:3001`
//! - `ADMIN_TEST_EMAIL` / `ADMIN_TEST_PASSWORD` - an existing `admin` account

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::expect_used)]

use reqwest::{Client, redirect};

/// Base URL for the storefront.
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned())
}

/// Base URL for the back-office.
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_owned())
}

/// Client with a cookie jar that does not follow redirects, so tests can
/// assert on `Location`.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Sign in to the back-office with the test account.
pub async fn admin_client() -> Client {
    let email = std::env::var("ADMIN_TEST_EMAIL").expect("ADMIN_TEST_EMAIL not set");
    let password = std::env::var("ADMIN_TEST_PASSWORD").expect("ADMIN_TEST_PASSWORD not set");

    let client = client();
    let resp = client
        .post(format!("{}/auth/login", admin_base_url()))
        .form(&[("email", email.as_str()), ("password", password.as_str())])
        .send()
        .await
        .expect("Failed to log in");

    assert!(
        resp.status().is_redirection(),
        "Login failed with status {}",
        resp.status()
    );
    client
}

/// `Location` header of a redirect.
#[must_use]
pub fn location(resp: &reqwest::Response) -> String {
    resp.headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}
