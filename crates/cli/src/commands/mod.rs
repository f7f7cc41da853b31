//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use mais_saude_core::config::{ConfigError, EnvReader};
use secrecy::SecretString;

/// `{prefix}_DATABASE_URL` or `DATABASE_URL`, after reading `.env`.
///
/// # Errors
///
/// Returns `ConfigError::Missing` when neither is set.
pub fn database_url(prefix: &'static str) -> Result<SecretString, ConfigError> {
    let _ = dotenvy::dotenv();
    EnvReader::process(prefix).database_url()
}
