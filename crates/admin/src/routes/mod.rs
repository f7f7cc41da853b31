//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! GET  /auth/login                 - Login page
//! POST /auth/login                 - Email and password sign-in (rate limited)
//! POST /auth/logout                - Logout
//!
//! # Dashboard
//! GET  /                           - Totals and latest orders
//!
//! # Products
//! GET  /products?q=                - Product listing with search
//! GET  /products/new               - New product form
//! POST /products                   - Create product
//! GET  /products/{id}/edit         - Edit form
//! POST /products/{id}              - Update product (images replaced)
//! POST /products/{id}/toggle       - Flip active
//! POST /products/{id}/delete       - Delete product
//!
//! # Categories
//! GET  /categories                 - Listing with create form
//! POST /categories                 - Create category
//! POST /categories/{id}            - Update category
//! POST /categories/{id}/delete     - Delete category
//!
//! # Orders
//! GET  /orders?status=             - Order listing
//! GET  /orders/{id}                - Order detail with items
//! POST /orders/{id}/status         - Change status
//! POST /orders/{id}/delete         - Delete order
//!
//! # Customers
//! GET  /customers?q=               - Customers aggregated from orders
//!
//! # Testimonials
//! GET  /testimonials?filter=       - Moderation list (all, pending, approved)
//! POST /testimonials/{id}/toggle   - Approve or hide
//! POST /testimonials/{id}/delete   - Delete
//!
//! # Settings
//! GET  /settings                   - Store settings
//! POST /settings                   - Save store settings (super admin)
//! ```
//!
//! Mutations answer with a redirect carrying `?success=` or `?error=`, which
//! the next page shows as a notice.

pub mod auth;
pub mod categories;
pub mod customers;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod settings;
pub mod testimonials;

use axum::{Router, response::Redirect};
use serde::Deserialize;

use mais_saude_core::AdminRole;

use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Build the full admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(products::router())
        .merge(categories::router())
        .merge(orders::router())
        .merge(customers::router())
        .merge(testimonials::router())
        .merge(settings::router())
}

/// Admin user view for templates.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub name: String,
    pub email: String,
    pub role_label: &'static str,
    pub can_write: bool,
    pub is_super_admin: bool,
}

impl From<&CurrentAdmin> for AdminUserView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            name: admin.name.clone(),
            email: admin.email.to_string(),
            role_label: admin.role.label(),
            can_write: admin.role.can_write(),
            is_super_admin: admin.role == AdminRole::SuperAdmin,
        }
    }
}

/// `?success=` / `?error=` notices left by a redirect.
#[derive(Debug, Default, Deserialize)]
pub struct NoticeParams {
    pub success: Option<String>,
    pub error: Option<String>,
}

/// Layout context shared by `base.html`.
#[derive(Debug, Clone)]
pub struct Layout {
    pub admin_user: AdminUserView,
    /// Path of the current section, to highlight the nav entry.
    pub current_path: &'static str,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

impl Layout {
    #[must_use]
    pub fn new(admin: &CurrentAdmin, current_path: &'static str, notices: NoticeParams) -> Self {
        let non_blank = |s: Option<String>| s.filter(|s| !s.trim().is_empty());
        Self {
            admin_user: AdminUserView::from(admin),
            current_path,
            success_message: non_blank(notices.success),
            error_message: non_blank(notices.error),
        }
    }

    /// Whether `path` is the active nav entry.
    #[must_use]
    pub fn is_active(&self, path: &str) -> bool {
        self.current_path == path
    }
}

/// Redirect to `path` with a success notice.
#[must_use]
pub fn redirect_success(path: &str, message: &str) -> Redirect {
    redirect_notice(path, "success", message)
}

/// Redirect to `path` with an error notice.
#[must_use]
pub fn redirect_error(path: &str, message: &str) -> Redirect {
    redirect_notice(path, "error", message)
}

fn redirect_notice(path: &str, key: &str, message: &str) -> Redirect {
    let separator = if path.contains('?') { '&' } else { '?' };
    Redirect::to(&format!(
        "{path}{separator}{key}={}",
        urlencoding::encode(message)
    ))
}

/// Treat an empty query value as absent.
#[must_use]
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::header::LOCATION;
    use axum::response::IntoResponse;

    use mais_saude_core::{AdminUserId, Email};

    use super::*;

    fn location(redirect: Redirect) -> String {
        redirect
            .into_response()
            .headers()
            .get(LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_owned()
    }

    #[test]
    fn test_redirect_notices_are_encoded() {
        assert_eq!(
            location(redirect_success("/products", "Produto salvo!")),
            "/products?success=Produto%20salvo%21"
        );
        assert_eq!(
            location(redirect_error("/orders?status=paid", "Falhou")),
            "/orders?status=paid&error=Falhou"
        );
    }

    #[test]
    fn test_layout_drops_blank_notices() {
        let admin = CurrentAdmin {
            id: AdminUserId::generate(),
            email: Email::parse("viewer@maissaude.com.br").unwrap(),
            name: "Leitor".to_owned(),
            role: AdminRole::Viewer,
        };
        let layout = Layout::new(
            &admin,
            "/orders",
            NoticeParams {
                success: Some("  ".to_owned()),
                error: Some("Algo deu errado".to_owned()),
            },
        );
        assert!(layout.success_message.is_none());
        assert_eq!(layout.error_message.as_deref(), Some("Algo deu errado"));
        assert!(!layout.admin_user.can_write);
        assert!(layout.is_active("/orders"));
    }
}
