//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! MS_ADMIN_PASSWORD='...' ms-cli admin create -e gerente@maissaude.com.br -n "Gerente" -r super_admin
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//! - `MS_ADMIN_PASSWORD` - password, when `--password` is not given

use mais_saude_admin::db;
use mais_saude_admin::services::{AdminAuthService, AuthError};
use mais_saude_core::AdminRole;
use mais_saude_core::config::ConfigError;
use thiserror::Error;

use super::database_url;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: super_admin, admin, viewer")]
    InvalidRole(String),

    /// User already exists.
    #[error("Admin user already exists with email: {0}")]
    UserExists(String),

    /// Email, password or storage failure from the auth service.
    #[error(transparent)]
    Auth(AuthError),
}

/// Create a new admin user with an Argon2 password hash.
///
/// # Errors
///
/// Returns an error if the role, email or password is invalid, the email is
/// already registered, or the database is unreachable.
pub async fn create_user(
    email: &str,
    name: &str,
    role: &str,
    password: &str,
) -> Result<(), AdminError> {
    let role: AdminRole = role
        .parse()
        .map_err(|_| AdminError::InvalidRole(role.to_owned()))?;

    let url = database_url("ADMIN")?;

    tracing::info!("Connecting to admin database...");
    let pool = db::create_pool(&url).await?;

    tracing::info!("Creating admin user: {} ({})", email, role);

    let user = AdminAuthService::new(&pool)
        .create_admin(email, name, role, password)
        .await
        .map_err(|e| match e {
            AuthError::AdminAlreadyExists => AdminError::UserExists(email.to_owned()),
            other => AdminError::Auth(other),
        })?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );

    Ok(())
}
