//! Checkout: the order form and the WhatsApp hand-off.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use mais_saude_core::Cart;

use super::cart::{CartView, load_cart, save_cart};
use super::page::PageContext;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{CspNonce, OptionalAuth};
use crate::models::{CurrentCustomer, Customer};
use crate::services::{AuthError, AuthService, CheckoutDetails, CheckoutError, CheckoutService};
use crate::state::AppState;

/// Checkout form data. Checkboxes arrive as `"on"` when ticked.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub complement: String,
    #[serde(default)]
    pub notes: String,
    pub use_saved_address: Option<String>,
    pub save_address: Option<String>,
}

impl CheckoutForm {
    /// Pre-fill from the customer's profile.
    fn from_customer(customer: Option<&Customer>) -> Self {
        let Some(c) = customer else {
            return Self::default();
        };
        Self {
            name: c.profile.name.clone(),
            phone: c.profile.phone.clone(),
            use_saved_address: c.profile.has_address().then(|| "on".to_owned()),
            ..Self::default()
        }
    }

    fn details(&self) -> CheckoutDetails {
        CheckoutDetails {
            name: self.name.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            neighborhood: self.neighborhood.clone(),
            complement: self.complement.clone(),
            notes: self.notes.clone(),
            use_saved_address: self.use_saved_address.is_some(),
            save_address: self.save_address.is_some(),
        }
    }
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub page: PageContext,
    pub cart: CartView,
    pub form: CheckoutForm,
    /// The signed-in customer's saved address, if any.
    pub saved_address: Option<String>,
    pub signed_in: bool,
    pub error: Option<String>,
}

/// Load the signed-in customer's full record. A deleted account counts as a guest.
async fn load_customer(
    state: &AppState,
    current: Option<&CurrentCustomer>,
) -> Result<Option<Customer>> {
    let Some(current) = current else {
        return Ok(None);
    };
    match AuthService::new(state.pool()).get_customer(current.id).await {
        Ok(customer) => Ok(Some(customer)),
        Err(AuthError::CustomerNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Display the checkout form.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(current): OptionalAuth,
    CspNonce(nonce): CspNonce,
) -> Result<Response> {
    let cart = load_cart(&session).await;
    if cart.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let customer = load_customer(&state, current.as_ref()).await?;
    let page = PageContext::load(&state, &session, current.as_ref(), nonce).await?;

    Ok(CheckoutTemplate {
        cart: CartView::new(&cart, &page.settings),
        form: CheckoutForm::from_customer(customer.as_ref()),
        saved_address: saved_address(customer.as_ref()),
        signed_in: customer.is_some(),
        error: None,
        page,
    }
    .into_response())
}

/// Record the order, clear the cart and send the browser to WhatsApp.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(current): OptionalAuth,
    CspNonce(nonce): CspNonce,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let cart = load_cart(&session).await;
    let customer = load_customer(&state, current.as_ref()).await?;
    let settings = state.cache().store_settings(state.pool()).await?;

    let placed = CheckoutService::new(state.pool())
        .place_order(&cart, &settings, customer.as_ref(), &form.details())
        .await;

    match placed {
        Ok(placed) => {
            save_cart(&session, &Cart::new()).await?;
            add_breadcrumb("checkout", "Order sent to WhatsApp", &[]);
            Ok(Redirect::to(&placed.whatsapp_url).into_response())
        }
        Err(CheckoutError::EmptyCart) => Ok(Redirect::to("/cart").into_response()),
        Err(CheckoutError::Repository(e)) => Err(AppError::Database(e)),
        Err(e) => {
            let page = PageContext::load(&state, &session, current.as_ref(), nonce).await?;
            let template = CheckoutTemplate {
                cart: CartView::new(&cart, &page.settings),
                saved_address: saved_address(customer.as_ref()),
                signed_in: customer.is_some(),
                error: Some(e.user_message()),
                form,
                page,
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
        }
    }
}

fn saved_address(customer: Option<&Customer>) -> Option<String> {
    customer
        .filter(|c| c.profile.has_address())
        .map(|c| c.profile.full_address())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use mais_saude_core::{CustomerId, Email, StoreSettings};

    use super::*;
    use crate::models::CustomerProfile;

    fn customer(address: &str) -> Customer {
        Customer {
            id: CustomerId::generate(),
            email: Email::parse("jose@exemplo.com").unwrap(),
            profile: CustomerProfile {
                name: "José".to_owned(),
                phone: "75991357869".to_owned(),
                address: address.to_owned(),
                ..CustomerProfile::default()
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_form_prefill() {
        let form = CheckoutForm::from_customer(Some(&customer("Rua B, 5")));
        assert_eq!(form.name, "José");
        assert!(form.use_saved_address.is_some());

        let form = CheckoutForm::from_customer(Some(&customer("")));
        assert!(form.use_saved_address.is_none());

        let form = CheckoutForm::from_customer(None);
        assert!(form.name.is_empty());
    }

    #[test]
    fn test_checkboxes_map_to_flags() {
        let form = CheckoutForm {
            save_address: Some("on".to_owned()),
            ..CheckoutForm::default()
        };
        let details = form.details();
        assert!(details.save_address);
        assert!(!details.use_saved_address);
    }

    #[test]
    fn test_saved_address() {
        assert_eq!(
            saved_address(Some(&customer("Rua B, 5"))).as_deref(),
            Some("Rua B, 5")
        );
        assert_eq!(saved_address(Some(&customer(" "))), None);
        assert_eq!(saved_address(None), None);
    }

    fn template(settings: StoreSettings) -> CheckoutTemplate {
        let cart = Cart::new();
        CheckoutTemplate {
            cart: CartView::new(&cart, &settings),
            form: CheckoutForm::default(),
            saved_address: None,
            signed_in: false,
            error: None,
            page: PageContext {
                nonce: "abc123".to_owned(),
                whatsapp_url: "https://wa.me/5575991357869".to_owned(),
                settings,
                categories: Vec::new(),
                customer_name: None,
                cart_count: 0,
                flash: None,
            },
        }
    }

    #[test]
    fn test_form_disabled_when_whatsapp_orders_off() {
        let html = template(StoreSettings {
            enable_whatsapp_orders: false,
            ..StoreSettings::default()
        })
        .render()
        .unwrap();

        assert!(html.contains("orders-disabled"));
        assert!(html.contains("<fieldset class=\"plain\" disabled>"));
        assert!(!html.contains("Enviar pedido pelo WhatsApp"));
    }

    #[test]
    fn test_form_enabled_by_default() {
        let html = template(StoreSettings::default()).render().unwrap();
        assert!(html.contains("Enviar pedido pelo WhatsApp"));
        assert!(!html.contains("orders-disabled"));
    }
}
