//! `admin.admin_user` queries.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use mais_saude_core::{AdminRole, AdminUserId, Email};

use super::RepositoryError;
use crate::models::admin_user::AdminUser;

const SELECT_USER: &str = "SELECT id, email, name, role, last_login_at, created_at, password_hash \
                           FROM admin.admin_user";

#[derive(sqlx::FromRow)]
struct UserRecord {
    id: AdminUserId,
    email: String,
    name: String,
    role: AdminRole,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    password_hash: String,
}

impl UserRecord {
    fn into_user(self) -> Result<(AdminUser, String), RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("admin_user {}: {e}", self.id))
        })?;
        let user = AdminUser {
            id: self.id,
            email,
            name: self.name,
            role: self.role,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
        };
        Ok((user, self.password_hash))
    }
}

/// Back-office accounts.
pub struct AdminUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminUserRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The account for `email` with its password hash.
    ///
    /// # Errors
    ///
    /// `RepositoryError::Database` on query failure, `DataCorruption` if the
    /// stored email no longer parses.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(AdminUser, String)>, RepositoryError> {
        sqlx::query_as::<_, UserRecord>(&format!("{SELECT_USER} WHERE email = $1"))
            .bind(email)
            .fetch_optional(self.pool)
            .await?
            .map(UserRecord::into_user)
            .transpose()
    }

    /// Insert an account.
    ///
    /// # Errors
    ///
    /// `RepositoryError::Conflict` when the email is already registered.
    pub async fn create(
        &self,
        email: &Email,
        name: &str,
        role: AdminRole,
        password_hash: &str,
    ) -> Result<AdminUser, RepositoryError> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO admin.admin_user (email, name, role, password_hash) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, email, name, role, last_login_at, created_at, password_hash",
        )
        .bind(email)
        .bind(name)
        .bind(role)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "email"))?;

        record.into_user().map(|(user, _)| user)
    }

    /// Set `last_login_at` to now.
    ///
    /// # Errors
    ///
    /// `RepositoryError::NotFound` if the account was deleted meanwhile.
    pub async fn record_login(&self, id: AdminUserId) -> Result<(), RepositoryError> {
        let updated =
            sqlx::query("UPDATE admin.admin_user SET last_login_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(self.pool)
                .await?;
        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
