//! Authentication route handlers for admin.

use askama::Template;
use axum::{
    Form, Router,
    extract::State,
    handler::Handler,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{clear_current_admin, login_rate_limiter, set_current_admin};
use crate::models::{CurrentAdmin, keys};
use crate::services::{AdminAuthService, AuthError};
use crate::state::AppState;

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginPageTemplate {
    email: String,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    email: String,
    password: String,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/auth/login",
            get(login_page).post(login.layer(login_rate_limiter())),
        )
        .route("/auth/logout", post(logout))
}

/// Render the login page.
///
/// GET /auth/login
async fn login_page(session: Session) -> Result<Response> {
    let signed_in = session
        .get::<CurrentAdmin>(keys::CURRENT_ADMIN)
        .await?
        .is_some();
    if signed_in {
        return Ok(Redirect::to("/").into_response());
    }

    let page = LoginPageTemplate {
        email: String::new(),
        error: None,
    };
    Ok(Html(page.render()?).into_response())
}

/// Check credentials and start the admin session.
///
/// POST /auth/login
#[instrument(skip(state, session, form), fields(email = %form.email))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let auth = AdminAuthService::new(state.pool());

    match auth.login(&form.email, &form.password).await {
        Ok(user) => {
            let current = CurrentAdmin::from(&user);
            set_current_admin(&session, &current).await?;
            set_sentry_user(&user.id, Some(user.email.as_str()));
            Ok(Redirect::to("/").into_response())
        }
        Err(err @ (AuthError::InvalidCredentials | AuthError::InvalidEmail(_))) => {
            tracing::warn!("Admin login rejected");
            let page = LoginPageTemplate {
                email: form.email,
                error: Some(err.user_message()),
            };
            Ok((StatusCode::UNAUTHORIZED, Html(page.render()?)).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// Logout and clear session.
///
/// POST /auth/logout
async fn logout(session: Session) -> Result<Redirect> {
    clear_current_admin(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/auth/login"))
}
