//! Admin user domain types.

use chrono::{DateTime, Utc};

use mais_saude_core::{AdminUserId, Email};

pub use mais_saude_core::AdminRole;

/// A back-office account.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub id: AdminUserId,
    pub email: Email,
    pub name: String,
    pub role: AdminRole,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
