//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during customer authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] mais_saude_core::EmailError),

    /// Invalid phone number.
    #[error("invalid phone: {0}")]
    InvalidPhone(#[from] mais_saude_core::PhoneError),

    /// Name left blank.
    #[error("name is required")]
    MissingName,

    /// Invalid credentials (wrong password or customer not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Customer not found.
    #[error("customer not found")]
    CustomerNotFound,

    /// Customer already exists.
    #[error("customer already exists")]
    CustomerAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Message safe to show on the login and registration forms.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidEmail(e) => e.to_string(),
            Self::InvalidPhone(e) => e.to_string(),
            Self::MissingName => "Informe seu nome.".to_owned(),
            Self::InvalidCredentials | Self::CustomerNotFound => {
                "E-mail ou senha incorretos.".to_owned()
            }
            Self::CustomerAlreadyExists => "Já existe uma conta com este e-mail.".to_owned(),
            Self::WeakPassword(msg) => msg.clone(),
            Self::Repository(_) | Self::PasswordHash => {
                "Não foi possível concluir. Tente novamente.".to_owned()
            }
        }
    }
}
