//! Authentication middleware and extractors for admin.
//!
//! Every back-office page needs a signed-in admin. Mutating handlers take
//! [`RequireWriteAccess`] instead, and settings changes [`RequireSuperAdmin`].

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentAdmin, keys};

/// Extractor that requires admin authentication.
///
/// If the admin is not logged in, returns a redirect to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(admin): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Olá, {}!", admin.name)
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

/// Extractor that requires an admin whose role may change records.
pub struct RequireWriteAccess(pub CurrentAdmin);

/// Extractor that requires a super admin.
pub struct RequireSuperAdmin(pub CurrentAdmin);

/// Rejection for the admin extractors.
#[derive(Debug, PartialEq, Eq)]
pub enum AdminAuthRejection {
    /// Not signed in.
    RedirectToLogin,
    /// No session layer on this route.
    Unauthorized,
    /// Signed in, but the role is not enough.
    Forbidden(&'static str),
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden(message) => (StatusCode::FORBIDDEN, message).into_response(),
        }
    }
}

async fn current_admin(parts: &Parts) -> Result<CurrentAdmin, AdminAuthRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AdminAuthRejection::Unauthorized)?;

    session
        .get::<CurrentAdmin>(keys::CURRENT_ADMIN)
        .await
        .ok()
        .flatten()
        .ok_or(AdminAuthRejection::RedirectToLogin)
}

impl<S> FromRequestParts<S> for RequireAdminAuth
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_admin(parts).await.map(Self)
    }
}

impl<S> FromRequestParts<S> for RequireWriteAccess
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = current_admin(parts).await?;
        if !admin.role.can_write() {
            return Err(AdminAuthRejection::Forbidden(
                "Seu perfil permite apenas visualizar.",
            ));
        }
        Ok(Self(admin))
    }
}

impl<S> FromRequestParts<S> for RequireSuperAdmin
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = current_admin(parts).await?;
        if !admin.role.can_manage_settings() {
            return Err(AdminAuthRejection::Forbidden(
                "Apenas super administradores podem alterar as configurações.",
            ));
        }
        Ok(Self(admin))
    }
}

/// Helper to set the current admin in the session.
///
/// Cycles the session ID first so a pre-login session cannot be fixated.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(keys::CURRENT_ADMIN, admin).await
}

/// Helper to end the admin session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::{Router, body::Body, http::Request, routing::get};
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, SessionManagerLayer};

    use mais_saude_core::{AdminRole, AdminUserId, Email};

    use super::*;

    fn admin(role: AdminRole) -> CurrentAdmin {
        CurrentAdmin {
            id: AdminUserId::generate(),
            email: Email::parse("gerente@maissaude.com.br").unwrap(),
            name: "Gerente".to_owned(),
            role,
        }
    }

    /// Router whose `/login-as` signs in with `role`, then `/write` and
    /// `/settings` exercise the role extractors.
    fn app(role: Option<AdminRole>) -> Router {
        let role = Arc::new(role);
        Router::new()
            .route(
                "/login-as",
                get(move |session: Session| {
                    let role = Arc::clone(&role);
                    async move {
                        if let Some(role) = *role {
                            set_current_admin(&session, &admin(role)).await.unwrap();
                        }
                        "ok"
                    }
                }),
            )
            .route("/read", get(|RequireAdminAuth(a): RequireAdminAuth| async move { a.name }))
            .route("/write", get(|_: RequireWriteAccess| async { "ok" }))
            .route("/settings", get(|_: RequireSuperAdmin| async { "ok" }))
            .layer(SessionManagerLayer::new(MemoryStore::default()).with_secure(false))
    }

    async fn status_as(role: Option<AdminRole>, path: &str) -> StatusCode {
        let app = app(role);
        let login = app
            .clone()
            .oneshot(Request::get("/login-as").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let mut request = Request::get(path);
        if let Some(cookie) = login.headers().get(axum::http::header::SET_COOKIE) {
            let pair = cookie.to_str().unwrap().split(';').next().unwrap().to_owned();
            request = request.header(axum::http::header::COOKIE, pair);
        }
        app.oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_anonymous_is_redirected() {
        assert_eq!(status_as(None, "/read").await, StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_viewer_can_read_but_not_write() {
        assert_eq!(status_as(Some(AdminRole::Viewer), "/read").await, StatusCode::OK);
        assert_eq!(
            status_as(Some(AdminRole::Viewer), "/write").await,
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn test_only_super_admin_changes_settings() {
        assert_eq!(status_as(Some(AdminRole::Admin), "/write").await, StatusCode::OK);
        assert_eq!(
            status_as(Some(AdminRole::Admin), "/settings").await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_as(Some(AdminRole::SuperAdmin), "/settings").await,
            StatusCode::OK
        );
    }
}
