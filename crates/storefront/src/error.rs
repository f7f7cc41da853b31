//! Handler error type.
//!
//! Route handlers return [`Result`]. Server-side failures are reported to
//! Sentry and logged; the shopper only ever sees a short Portuguese message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AuthError, CheckoutError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Unknown slug or inactive product.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) | Self::Database(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Auth(AuthError::InvalidCredentials | AuthError::CustomerNotFound) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Auth(AuthError::CustomerAlreadyExists) => StatusCode::CONFLICT,
            Self::Auth(
                AuthError::WeakPassword(_)
                | AuthError::InvalidEmail(_)
                | AuthError::InvalidPhone(_)
                | AuthError::MissingName,
            )
            | Self::Checkout(
                CheckoutError::EmptyCart
                | CheckoutError::MissingField(_)
                | CheckoutError::InvalidPhone(_),
            ) => {
                StatusCode::BAD_REQUEST
            }
            Self::Checkout(CheckoutError::OrdersDisabled) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_)
            | Self::Session(_)
            | Self::Template(_)
            | Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash)
            | Self::Checkout(CheckoutError::Repository(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::NotFound(_) | Self::Database(RepositoryError::NotFound) => {
                "Página não encontrada.".to_owned()
            }
            Self::BadRequest(reason) => reason.clone(),
            Self::Auth(err) => err.user_message(),
            Self::Checkout(err) => err.user_message(),
            Self::Database(_) | Self::Session(_) | Self::Template(_) => {
                "Algo deu errado. Tente novamente em instantes.".to_owned()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            let event_id = sentry::capture_error(&self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "request failed");
        }
        (status, self.public_message()).into_response()
    }
}

/// Attach the signed-in customer to subsequent Sentry events.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(str::to_owned),
            ..Default::default()
        }));
    });
}

pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| scope.set_user(None));
}

/// Record a shopper action so error reports show what led up to them.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) {
    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some(category.to_owned()),
        message: Some(message.to_owned()),
        level: sentry::Level::Info,
        data: data
            .iter()
            .map(|(k, v)| ((*k).to_owned(), serde_json::Value::from(*v)))
            .collect(),
        ..Default::default()
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: impl Into<AppError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_not_found() {
        assert_eq!(status_of(AppError::NotFound("dipirona-500mg".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(RepositoryError::NotFound), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_checkout_statuses() {
        assert_eq!(status_of(CheckoutError::EmptyCart), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(CheckoutError::MissingField("nome")), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(CheckoutError::OrdersDisabled), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            status_of(CheckoutError::InvalidPhone(mais_saude_core::PhoneError::InvalidLength)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_auth_statuses() {
        assert_eq!(status_of(AuthError::CustomerAlreadyExists), StatusCode::CONFLICT);
        assert_eq!(status_of(AuthError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::MissingName), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_details_stay_private() {
        let err = AppError::Database(RepositoryError::DataCorruption("bad email".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.public_message().contains("bad email"));
    }
}
