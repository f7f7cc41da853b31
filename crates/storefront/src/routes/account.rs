//! Account route handlers (require a signed-in customer).

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

use mais_saude_core::catalog::Order;

use super::page::{PageContext, set_flash};
use crate::db::OrderRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::{CspNonce, RequireAuth, set_current_customer};
use crate::models::{CurrentCustomer, Customer, CustomerProfile};
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

/// Orders listed on the account page.
const RECENT_ORDERS: i64 = 10;

/// Profile form data.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileForm {
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
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zipcode: String,
}

impl From<ProfileForm> for CustomerProfile {
    fn from(f: ProfileForm) -> Self {
        Self {
            name: f.name,
            phone: f.phone,
            address: f.address,
            neighborhood: f.neighborhood,
            complement: f.complement,
            city: f.city,
            state: f.state,
            zipcode: f.zipcode,
        }
    }
}

/// Account page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/show.html")]
pub struct AccountTemplate {
    pub page: PageContext,
    pub email: String,
    pub profile: CustomerProfile,
    pub orders: Vec<Order>,
    pub error: Option<String>,
}

async fn render(
    state: &AppState,
    session: &Session,
    current: &CurrentCustomer,
    nonce: String,
    customer: &Customer,
    profile: CustomerProfile,
    error: Option<String>,
) -> Result<AccountTemplate> {
    let page = PageContext::load(state, session, Some(current), nonce).await?;
    let orders = OrderRepository::new(state.pool())
        .list_for_customer(customer.id, RECENT_ORDERS)
        .await?;

    Ok(AccountTemplate {
        page,
        email: customer.email.as_str().to_owned(),
        profile,
        orders,
        error,
    })
}

/// Account overview: profile form and recent orders.
#[instrument(skip_all, fields(customer_id = %current.id))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    CspNonce(nonce): CspNonce,
) -> Result<Response> {
    let customer = match AuthService::new(state.pool()).get_customer(current.id).await {
        Ok(customer) => customer,
        Err(AuthError::CustomerNotFound) => {
            // Account removed while signed in.
            session.flush().await?;
            return Ok(Redirect::to("/auth/login").into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let profile = customer.profile.clone();
    let template = render(&state, &session, &current, nonce, &customer, profile, None).await?;
    Ok(template.into_response())
}

/// Save the profile.
#[instrument(skip_all, fields(customer_id = %current.id))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    CspNonce(nonce): CspNonce,
    Form(form): Form<ProfileForm>,
) -> Result<Response> {
    let auth = AuthService::new(state.pool());
    let submitted = CustomerProfile::from(form);

    match auth.update_profile(current.id, submitted.clone()).await {
        Ok(customer) => {
            // Keep the header greeting in sync with the new name.
            let refreshed = CurrentCustomer {
                name: customer.profile.name.clone(),
                ..current
            };
            set_current_customer(&session, &refreshed).await?;
            set_flash(&session, "Dados atualizados com sucesso!").await;
            Ok(Redirect::to("/account").into_response())
        }
        Err(e @ (AuthError::MissingName | AuthError::InvalidPhone(_))) => {
            let customer = auth.get_customer(current.id).await?;
            let template = render(
                &state,
                &session,
                &current,
                nonce,
                &customer,
                submitted,
                Some(e.user_message()),
            )
            .await?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
