//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                           - Home page
//! GET  /manifest.webmanifest       - PWA manifest from store settings
//!
//! # Catalog
//! GET  /products?category=&q=      - Product listing
//! GET  /products/{slug}            - Product detail
//! GET  /products/{slug}/quick-view - Quick view fragment (HTMX)
//! GET  /search?q=                  - Search suggestions fragment (HTMX)
//!
//! # Cart (HTMX fragments, session-backed)
//! GET  /cart                       - Cart page
//! POST /cart/add                   - Add to cart (returns count badge, triggers cart-updated)
//! POST /cart/update                - Update quantity (returns cart_items fragment)
//! POST /cart/remove                - Remove line (returns cart_items fragment)
//! POST /cart/clear                 - Empty the cart
//! GET  /cart/count                 - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout                   - Order form
//! POST /checkout                   - Record order, redirect to wa.me
//!
//! # Feedback
//! POST /testimonials               - Feedback form (fragment, rate limited)
//!
//! # Auth
//! GET  /auth/login                 - Login page
//! POST /auth/login                 - Login action (rate limited)
//! GET  /auth/register              - Register page
//! POST /auth/register              - Register action (rate limited)
//! POST /auth/logout                - Logout action
//!
//! # Account (requires auth)
//! GET  /account                    - Profile and recent orders
//! POST /account                    - Save profile
//!
//! # JSON API
//! GET  /api/products               - Products (?category_id=&q=&active_only=)
//! GET  /api/products/{slug}        - One product
//! GET  /api/categories             - Categories
//! GET  /api/testimonials           - Approved testimonials
//! POST /api/testimonials           - Submit feedback (rate limited)
//! ```

pub mod account;
pub mod api;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod manifest;
pub mod page;
pub mod products;
pub mod search;
pub mod testimonials;

use axum::{
    Router,
    handler::Handler,
    http::HeaderMap,
    routing::{get, post},
};

use crate::middleware::{auth_rate_limiter, feedback_rate_limiter};
use crate::state::AppState;

/// Whether the request was issued by HTMX.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("hx-request")
        .is_some_and(|v| v.as_bytes() == b"true")
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(auth::login_page).post(auth::login.layer(auth_rate_limiter())),
        )
        .route(
            "/register",
            get(auth::register_page).post(auth::register.layer(auth_rate_limiter())),
        )
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{slug}", get(products::show))
        .route("/{slug}/quick-view", get(products::quick_view))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(api::products))
        .route("/products/{slug}", get(api::product))
        .route("/categories", get(api::categories))
        .route(
            "/testimonials",
            get(api::testimonials).post(api::submit_testimonial.layer(feedback_rate_limiter())),
        )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/manifest.webmanifest", get(manifest::webmanifest))
        .route("/search", get(search::suggest))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", get(checkout::show).post(checkout::submit))
        .route(
            "/testimonials",
            post(testimonials::submit.layer(feedback_rate_limiter())),
        )
        .nest("/account", Router::new().route("/", get(account::show).post(account::update)))
        .nest("/auth", auth_routes())
        .nest("/api", api_routes())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_is_htmx() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx(&headers));
        headers.insert("hx-request", HeaderValue::from_static("true"));
        assert!(is_htmx(&headers));
    }
}
