//! Error type returned by back-office handlers.
//!
//! Failures on our side go to Sentry and the log; staff get a plain message
//! and the status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::AuthError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

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
            Self::Database(RepositoryError::Conflict(_))
            | Self::Auth(AuthError::AdminAlreadyExists) => StatusCode::CONFLICT,
            Self::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) | Self::Auth(AuthError::InvalidEmail(_) | AuthError::WeakPassword(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Database(RepositoryError::Database(_) | RepositoryError::DataCorruption(_))
            | Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash)
            | Self::Session(_)
            | Self::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::NotFound(what) => format!("Não encontrado: {what}"),
            Self::Database(RepositoryError::NotFound) => "Registro não encontrado.".to_owned(),
            Self::Database(RepositoryError::Conflict(what)) => format!("Conflito: {what}"),
            Self::BadRequest(reason) => reason.clone(),
            Self::Auth(err) if !self.status().is_server_error() => err.to_string(),
            _ => "Erro interno. A falha foi registrada.".to_owned(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "admin request failed");
        }
        (status, self.public_message()).into_response()
    }
}

/// Attach the signed-in admin to subsequent Sentry events.
pub fn set_sentry_user(admin_user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_user_id.to_string()),
            email: email.map(str::to_owned),
            ..Default::default()
        }));
    });
}

pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| scope.set_user(None));
}
