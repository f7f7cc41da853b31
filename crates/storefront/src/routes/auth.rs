//! Authentication route handlers.
//!
//! Email and password login for customers. A successful login or
//! registration lands on `next` (same-site paths only) or `/account`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::page::{PageContext, set_flash};
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{
    CspNonce, OptionalAuth, clear_current_customer, safe_next_path, set_current_customer,
};
use crate::models::{CurrentCustomer, Customer};
use crate::services::auth::{AuthError, AuthService, MIN_PASSWORD_LENGTH, Registration};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub password_confirm: String,
    pub next: Option<String>,
}

/// Where to go after signing in.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub error: Option<String>,
    pub email: String,
    pub next: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
    pub error: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub next: String,
    pub min_password_length: usize,
}

// =============================================================================
// Helpers
// =============================================================================

fn next_or_account(next: Option<&str>) -> String {
    safe_next_path(next).unwrap_or("/account").to_owned()
}

async fn sign_in(session: &Session, customer: &Customer) -> Result<()> {
    let current = CurrentCustomer {
        id: customer.id,
        email: customer.email.clone(),
        name: customer.profile.name.clone(),
    };
    set_current_customer(session, &current).await?;
    set_sentry_user(&customer.id, Some(customer.email.as_str()));
    Ok(())
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page. Signed-in customers go straight on.
#[instrument(skip_all)]
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    CspNonce(nonce): CspNonce,
    Query(query): Query<NextQuery>,
) -> Result<Response> {
    if customer.is_some() {
        return Ok(Redirect::to(&next_or_account(query.next.as_deref())).into_response());
    }

    let page = PageContext::load(&state, &session, None, nonce).await?;
    Ok(LoginTemplate {
        page,
        error: None,
        email: String::new(),
        next: safe_next_path(query.next.as_deref()).unwrap_or_default().to_owned(),
    }
    .into_response())
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    match AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(customer) => {
            sign_in(&session, &customer).await?;
            tracing::info!(customer_id = %customer.id, "Customer logged in");
            Ok(Redirect::to(&next_or_account(form.next.as_deref())).into_response())
        }
        Err(e @ (AuthError::Repository(_) | AuthError::PasswordHash)) => Err(e.into()),
        Err(e) => {
            tracing::warn!("Login failed: {e}");
            let page = PageContext::load(&state, &session, None, nonce).await?;
            let template = LoginTemplate {
                page,
                error: Some(e.user_message()),
                email: form.email,
                next: safe_next_path(form.next.as_deref()).unwrap_or_default().to_owned(),
            };
            Ok((StatusCode::UNAUTHORIZED, template).into_response())
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
#[instrument(skip_all)]
pub async fn register_page(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    Query(query): Query<NextQuery>,
) -> Result<impl IntoResponse> {
    let page = PageContext::load(&state, &session, None, nonce).await?;
    Ok(RegisterTemplate {
        page,
        error: None,
        name: String::new(),
        email: String::new(),
        phone: String::new(),
        next: safe_next_path(query.next.as_deref()).unwrap_or_default().to_owned(),
        min_password_length: MIN_PASSWORD_LENGTH,
    })
}

/// Handle registration form submission. The new customer is signed in.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let result = if form.password == form.password_confirm {
        let registration = Registration {
            email: &form.email,
            password: &form.password,
            name: &form.name,
            phone: &form.phone,
        };
        match AuthService::new(state.pool()).register(&registration).await {
            Ok(customer) => Ok(customer),
            Err(e @ (AuthError::Repository(_) | AuthError::PasswordHash)) => return Err(e.into()),
            Err(e) => Err(e.user_message()),
        }
    } else {
        Err("As senhas não conferem.".to_owned())
    };

    match result {
        Ok(customer) => {
            sign_in(&session, &customer).await?;
            set_flash(&session, "Conta criada com sucesso!").await;
            tracing::info!(customer_id = %customer.id, "Customer registered");
            Ok(Redirect::to(&next_or_account(form.next.as_deref())).into_response())
        }
        Err(message) => {
            let page = PageContext::load(&state, &session, None, nonce).await?;
            let template = RegisterTemplate {
                page,
                error: Some(message),
                name: form.name,
                email: form.email,
                phone: form.phone,
                next: safe_next_path(form.next.as_deref()).unwrap_or_default().to_owned(),
                min_password_length: MIN_PASSWORD_LENGTH,
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Log out, keeping the cart.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_customer(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_or_account() {
        assert_eq!(next_or_account(Some("/checkout")), "/checkout");
        assert_eq!(next_or_account(Some("https://evil.example")), "/account");
        assert_eq!(next_or_account(None), "/account");
    }
}
