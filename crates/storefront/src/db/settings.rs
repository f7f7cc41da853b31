//! Store settings reads.
//!
//! The settings document is written by the back-office; the storefront only
//! reads it (through the cache in [`crate::cache`]).

use serde_json::Value as JsonValue;
use sqlx::PgPool;

use mais_saude_core::settings::{STORE_SETTINGS_KEY, StoreSettings};

use super::RepositoryError;

/// Get a raw setting value.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_setting(pool: &PgPool, key: &str) -> Result<Option<JsonValue>, RepositoryError> {
    let value = sqlx::query_scalar::<_, JsonValue>("SELECT value FROM shop.setting WHERE key = $1")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    Ok(value)
}

/// Load store settings merged over the defaults.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn load_store_settings(pool: &PgPool) -> Result<StoreSettings, RepositoryError> {
    let stored = get_setting(pool, STORE_SETTINGS_KEY).await?;
    Ok(StoreSettings::from_stored(stored))
}
