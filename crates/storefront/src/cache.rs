//! Short-lived cache for store settings and the category list.
//!
//! Both are read on nearly every page and change rarely. Entries expire after
//! the configured TTL (60 seconds by default), so edits made in the
//! back-office show up on the storefront within a minute.

use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::debug;

use mais_saude_core::StoreSettings;
use mais_saude_core::catalog::Category;

use crate::db::{CatalogRepository, RepositoryError, settings};

/// Cache key.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Settings,
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Settings(Box<StoreSettings>),
    Categories(Vec<Category>),
}

/// Read-through cache over the settings document and categories.
#[derive(Clone)]
pub struct CatalogCache {
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(16).time_to_live(ttl).build();
        Self { cache }
    }

    /// Store settings merged over the defaults.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the settings cannot be loaded.
    pub async fn store_settings(&self, pool: &PgPool) -> Result<StoreSettings, RepositoryError> {
        if let Some(CacheValue::Settings(s)) = self.cache.get(&CacheKey::Settings).await {
            debug!("Cache hit for settings");
            return Ok(*s);
        }

        let loaded = settings::load_store_settings(pool).await?;
        self.cache
            .insert(CacheKey::Settings, CacheValue::Settings(Box::new(loaded.clone())))
            .await;
        Ok(loaded)
    }

    /// Categories ordered by `sort`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn categories(&self, pool: &PgPool) -> Result<Vec<Category>, RepositoryError> {
        if let Some(CacheValue::Categories(c)) = self.cache.get(&CacheKey::Categories).await {
            debug!("Cache hit for categories");
            return Ok(c);
        }

        let loaded = CatalogRepository::new(pool).list_categories().await?;
        self.cache
            .insert(CacheKey::Categories, CacheValue::Categories(loaded.clone()))
            .await;
        Ok(loaded)
    }

    /// Invalidate all cached data.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cached_settings_are_returned_without_db() {
        let cache = CatalogCache::new(Duration::from_secs(60));
        let stored = StoreSettings {
            store_name: "Drogaria Teste".to_owned(),
            ..StoreSettings::default()
        };
        cache
            .cache
            .insert(CacheKey::Settings, CacheValue::Settings(Box::new(stored)))
            .await;

        // A lazy pool never connects unless queried.
        let pool = PgPool::connect_lazy("postgres://localhost/unused").ok();
        let Some(pool) = pool else { return };
        let settings = cache.store_settings(&pool).await.ok();
        assert_eq!(
            settings.map(|s| s.store_name),
            Some("Drogaria Teste".to_owned())
        );
    }

    #[tokio::test]
    async fn test_invalidate_all() {
        let cache = CatalogCache::new(Duration::from_secs(60));
        cache
            .cache
            .insert(CacheKey::Categories, CacheValue::Categories(Vec::new()))
            .await;
        cache.invalidate_all().await;
        assert!(cache.cache.get(&CacheKey::Categories).await.is_none());
    }
}
