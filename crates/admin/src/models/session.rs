//! What the back-office keeps in a signed-in staff session.

use serde::{Deserialize, Serialize};

use mais_saude_core::{AdminUserId, Email};

use super::admin_user::{AdminRole, AdminUser};

/// Identity snapshot taken at login. Role changes apply on the next login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub id: AdminUserId,
    pub email: Email,
    pub name: String,
    pub role: AdminRole,
}

impl From<&AdminUser> for CurrentAdmin {
    fn from(user: &AdminUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

pub mod keys {
    pub const CURRENT_ADMIN: &str = "current_admin";
}
