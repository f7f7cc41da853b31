//! Cart route handlers.
//!
//! The cart lives in the session. Every mutation answers HTMX requests with a
//! fragment plus an `HX-Trigger: cart-updated` header so the header badge
//! refreshes itself; plain form posts are redirected back to `/cart`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use mais_saude_core::types::price::PRICE_ON_REQUEST;
use mais_saude_core::{Cart, CartLine, Price, ProductId, StoreSettings};

use super::is_htmx;
use super::page::PageContext;
use crate::db::CatalogRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{CspNonce, OptionalAuth};
use crate::models::session_keys;
use crate::state::AppState;

const CART_UPDATED: (&str, &str) = ("HX-Trigger", "cart-updated");

// =============================================================================
// View Types
// =============================================================================

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub product_id: String,
    pub slug: String,
    pub name: String,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub item_count: u32,
    /// Some lines are sold on request and are not part of the total.
    pub has_unpriced: bool,
}

impl CartView {
    /// Build the view, hiding prices when the store does not show them.
    #[must_use]
    pub fn new(cart: &Cart, settings: &StoreSettings) -> Self {
        let label = |price: Option<Price>| {
            if settings.show_prices {
                Price::display_or_on_request(price)
            } else {
                PRICE_ON_REQUEST.to_owned()
            }
        };

        Self {
            lines: cart
                .lines()
                .iter()
                .map(|line| CartLineView {
                    product_id: line.product_id.to_string(),
                    slug: line.slug.clone(),
                    name: line.name.clone(),
                    image_url: line.image_url.clone(),
                    quantity: line.quantity,
                    unit_price: label(line.price),
                    line_total: label(line.line_total()),
                })
                .collect(),
            total: label(Some(cart.total_price())),
            item_count: cart.total_items(),
            has_unpriced: cart.has_unpriced_lines(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the cart from the session. A missing or unreadable cart is empty.
pub async fn load_cart(session: &Session) -> Cart {
    match session.get::<Cart>(session_keys::CART).await {
        Ok(cart) => cart.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Failed to read cart from session: {e}");
            Cart::new()
        }
    }
}

/// Store the cart in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_cart(session: &Session, cart: &Cart) -> std::result::Result<(), AppError> {
    session.insert(session_keys::CART, cart).await?;
    Ok(())
}

// =============================================================================
// Form Types
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Update cart form data. Quantities below 1 remove the line.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub page: PageContext,
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse> {
    let page = PageContext::load(&state, &session, customer.as_ref(), nonce).await?;
    let cart = CartView::new(&load_cart(&session).await, &page.settings);

    Ok(CartShowTemplate { page, cart })
}

/// Add a product to the cart.
///
/// Only active products can be added. The line snapshots name, price and
/// primary image at this moment.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = CatalogRepository::new(state.pool())
        .get_active_product(form.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("produto".to_owned()))?;

    let mut cart = load_cart(&session).await;
    cart.add(CartLine::from_product(&product, form.quantity.unwrap_or(1)));
    save_cart(&session, &cart).await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        &[("product", product.product.slug.as_str())],
    );

    if is_htmx(&headers) {
        let count = cart.total_items();
        return Ok((AppendHeaders([CART_UPDATED]), CartCountTemplate { count }).into_response());
    }
    Ok(Redirect::to("/cart").into_response())
}

/// Update a line's quantity.
#[instrument(skip(state, session, headers))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await;
    cart.set_quantity(form.product_id, form.quantity);
    save_cart(&session, &cart).await?;

    items_response(&state, &headers, &cart).await
}

/// Remove a line.
#[instrument(skip(state, session, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await;
    cart.remove(form.product_id);
    save_cart(&session, &cart).await?;

    items_response(&state, &headers, &cart).await
}

/// Empty the cart.
#[instrument(skip_all)]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> Result<Response> {
    let cart = Cart::new();
    save_cart(&session, &cart).await?;

    items_response(&state, &headers, &cart).await
}

/// Get cart count badge (HTMX).
#[instrument(skip_all)]
pub async fn count(session: Session) -> impl IntoResponse {
    CartCountTemplate {
        count: load_cart(&session).await.total_items(),
    }
}

async fn items_response(state: &AppState, headers: &HeaderMap, cart: &Cart) -> Result<Response> {
    if !is_htmx(headers) {
        return Ok(Redirect::to("/cart").into_response());
    }
    let settings = state.cache().store_settings(state.pool()).await?;
    let cart = CartView::new(cart, &settings);
    Ok((AppendHeaders([CART_UPDATED]), CartItemsTemplate { cart }).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add(CartLine {
            product_id: ProductId::generate(),
            slug: "dipirona".to_owned(),
            name: "Dipirona 500mg".to_owned(),
            price: Some(Price::from_cents(1250)),
            image_url: None,
            quantity: 2,
        });
        cart.add(CartLine {
            product_id: ProductId::generate(),
            slug: "manipulado".to_owned(),
            name: "Manipulado".to_owned(),
            price: None,
            image_url: None,
            quantity: 1,
        });
        cart
    }

    #[test]
    fn test_cart_view_with_prices() {
        let view = CartView::new(&cart(), &StoreSettings::default());
        assert_eq!(view.item_count, 3);
        assert_eq!(view.total, "R$ 25,00");
        assert!(view.has_unpriced);
        let labels: Vec<_> = view.lines.iter().map(|l| l.line_total.as_str()).collect();
        assert_eq!(labels, ["R$ 25,00", "Sob consulta"]);
    }

    #[test]
    fn test_cart_view_hides_prices() {
        let settings = StoreSettings {
            show_prices: false,
            ..StoreSettings::default()
        };
        let view = CartView::new(&cart(), &settings);
        assert_eq!(view.total, "Sob consulta");
        assert!(view.lines.iter().all(|l| l.unit_price == "Sob consulta"));
    }
}
