//! Store settings database operations.
//!
//! The whole [`StoreSettings`] document is stored as JSON under
//! [`STORE_SETTINGS_KEY`] in `shop.setting`; the storefront reads the same row.

use serde_json::Value as JsonValue;
use sqlx::PgPool;

use mais_saude_core::settings::{STORE_SETTINGS_KEY, StoreSettings};

use super::RepositoryError;

/// Get a setting value.
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

/// Set a setting value.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn set_setting(pool: &PgPool, key: &str, value: &JsonValue) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO shop.setting (key, value)
        VALUES ($1, $2)
        ON CONFLICT (key) DO UPDATE SET value = $2, updated_at = NOW()
        ",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
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

/// Replace the store settings document.
///
/// # Errors
///
/// Returns `RepositoryError::DataCorruption` if the settings cannot be serialized.
/// Returns `RepositoryError::Database` if the write fails.
pub async fn save_store_settings(
    pool: &PgPool,
    settings: &StoreSettings,
) -> Result<(), RepositoryError> {
    let value = serde_json::to_value(settings)
        .map_err(|e| RepositoryError::DataCorruption(format!("settings serialization: {e}")))?;
    set_setting(pool, STORE_SETTINGS_KEY, &value).await
}
