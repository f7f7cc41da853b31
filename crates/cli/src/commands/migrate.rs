//! Database migration commands.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`) - storefront database
//! - `ADMIN_DATABASE_URL` (or `DATABASE_URL`) - admin database
//!
//! # Migration Files
//!
//! Storefront migrations: `crates/storefront/migrations/` (`shop` schema and
//! customer sessions). Admin migrations: `crates/admin/migrations/` (`admin`
//! schema). Both sets may run against the same database, so each migrator
//! ignores versions applied by the other.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;

use mais_saude_core::config::ConfigError;

use super::database_url;

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns an error if the URL is missing, the connection fails or a
/// migration fails.
pub async fn storefront() -> Result<(), MigrationError> {
    let url = database_url("STOREFRONT")?;
    run(
        "storefront",
        sqlx::migrate!("../storefront/migrations"),
        url.expose_secret(),
    )
    .await
}

/// Run admin database migrations.
///
/// # Errors
///
/// Returns an error if the URL is missing, the connection fails or a
/// migration fails.
pub async fn admin() -> Result<(), MigrationError> {
    let url = database_url("ADMIN")?;
    run("admin", sqlx::migrate!("../admin/migrations"), url.expose_secret()).await
}

async fn run(target: &str, mut migrator: Migrator, url: &str) -> Result<(), MigrationError> {
    tracing::info!("Connecting to {target} database...");
    let pool = PgPool::connect(url).await?;

    tracing::info!(
        count = migrator.iter().count(),
        "Running {target} migrations..."
    );
    migrator.set_ignore_missing(true);
    migrator.run(&pool).await?;

    tracing::info!("{target} migrations complete!");
    Ok(())
}
