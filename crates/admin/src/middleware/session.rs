//! Back-office sessions.
//!
//! Kept in `admin.session` (created by the admin migrations), apart from the
//! storefront's customer sessions. Cookies are `SameSite=Strict` and lapse
//! after a day without activity.

use sqlx::PgPool;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AdminConfig;

pub const SESSION_COOKIE_NAME: &str = "ms_admin_session";

const IDLE_TIMEOUT: Duration = Duration::hours(24);

/// Session layer backed by `admin.session`.
///
/// # Panics
///
/// Only if `admin`/`session` stopped being valid identifiers for the store.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &AdminConfig,
) -> SessionManagerLayer<PostgresStore> {
    let store = PostgresStore::new(pool.clone())
        .with_schema_name("admin")
        .and_then(|store| store.with_table_name("session"))
        .expect("admin.session is a valid store location");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(IDLE_TIMEOUT))
        .with_same_site(SameSite::Strict)
        .with_secure(config.is_https())
        .with_http_only(true)
        .with_path("/")
}
