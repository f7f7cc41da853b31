//! Customer identity extractors and session helpers.

use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use tower_sessions::Session;

use crate::models::{CurrentCustomer, session_keys};

/// The signed-in customer, or a rejection.
///
/// Pages redirect to the login form with `next` set to the requested path and
/// query; `/api/` routes answer `401`.
pub struct RequireAuth(pub CurrentCustomer);

/// The signed-in customer, if any. Never rejects.
pub struct OptionalAuth(pub Option<CurrentCustomer>);

pub enum AuthRejection {
    RedirectToLogin(String),
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(next) => {
                Redirect::to(&format!("/auth/login?next={}", urlencoding::encode(&next)))
                    .into_response()
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

/// Reads the customer from the session the session layer attached, treating
/// store errors as signed out.
async fn session_customer(parts: &Parts) -> Option<CurrentCustomer> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not read customer from session");
            None
        })
}

impl<S: Send + Sync> FromRequestParts<S> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(customer) = session_customer(parts).await {
            return Ok(Self(customer));
        }
        if parts.uri.path().starts_with("/api/") {
            return Err(AuthRejection::Unauthorized);
        }
        let next = parts
            .uri
            .path_and_query()
            .map_or_else(|| parts.uri.path().to_owned(), ToString::to_string);
        Err(AuthRejection::RedirectToLogin(next))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(session_customer(parts).await))
    }
}

/// Sign the customer in, under a fresh session ID.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_customer(
    session: &Session,
    customer: &CurrentCustomer,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(session_keys::CURRENT_CUSTOMER, customer)
        .await
}

/// Sign the customer out. The cart stays in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_customer(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
        .await?;
    Ok(())
}

/// Only same-site paths are accepted as post-login destinations.
#[must_use]
pub fn safe_next_path(next: Option<&str>) -> Option<&str> {
    next.filter(|p| p.starts_with('/') && !p.starts_with("//") && !p.contains('\\'))
}
