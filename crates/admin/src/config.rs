//! Back-office configuration.
//!
//! Read from `ADMIN_*` variables: `ADMIN_DATABASE_URL` (falling back to
//! `DATABASE_URL`), `ADMIN_BASE_URL`, `ADMIN_SESSION_SECRET`, and optionally
//! `ADMIN_HOST`/`ADMIN_PORT` (default `127.0.0.1:3001`). The shared `SENTRY_*`
//! variables apply as well.
//!
//! Setting both `ADMIN_TLS_CERT` and `ADMIN_TLS_KEY` (PEM text) makes the
//! binary terminate TLS itself.

use std::net::SocketAddr;

use mais_saude_core::config::{EnvReader, SentryConfig};
use secrecy::SecretString;

pub use mais_saude_core::config::ConfigError;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_TRACES_SAMPLE_RATE: f32 = 1.0;

/// Back-office settings, read once at startup.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub database_url: SecretString,
    pub listen: SocketAddr,
    pub base_url: String,
    pub session_secret: SecretString,
    pub sentry: SentryConfig,
    pub tls: Option<TlsConfig>,
}

/// PEM material for serving HTTPS directly.
#[derive(Clone)]
pub struct TlsConfig {
    pub cert_pem: String,
    pub key_pem: SecretString,
}

impl std::fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConfig")
            .field("cert_pem", &format_args!("{} bytes", self.cert_pem.len()))
            .finish_non_exhaustive()
    }
}

impl TlsConfig {
    fn load(env: &EnvReader<'_>) -> Result<Option<Self>, ConfigError> {
        match (env.optional("TLS_CERT"), env.optional("TLS_KEY")) {
            (None, None) => Ok(None),
            (Some(cert_pem), Some(key)) => Ok(Some(Self {
                cert_pem,
                key_pem: SecretString::from(key),
            })),
            (Some(_), None) => Err(ConfigError::Missing(env.var("TLS_KEY"))),
            (None, Some(_)) => Err(ConfigError::Missing(env.var("TLS_CERT"))),
        }
    }
}

impl AdminConfig {
    /// Load from the process environment, after reading `.env` if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for missing or malformed variables, a weak
    /// session secret, or only half of the TLS pair.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load(&EnvReader::process("ADMIN"))
    }

    /// Load through an explicit reader.
    ///
    /// # Errors
    ///
    /// See [`AdminConfig::from_env`].
    pub fn load(env: &EnvReader<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: env.database_url()?,
            listen: env.listen_addr(DEFAULT_PORT)?,
            base_url: env.url("BASE_URL")?,
            session_secret: env.secret("SESSION_SECRET")?,
            sentry: SentryConfig::load(env, DEFAULT_TRACES_SAMPLE_RATE)?,
            tls: TlsConfig::load(env)?,
        })
    }

    /// Whether session cookies must be marked `Secure`.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.tls.is_some() || self.base_url.starts_with("https://")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(extra: &[(&str, &str)]) -> Result<AdminConfig, ConfigError> {
        let mut map: HashMap<&str, &str> = HashMap::from([
            ("ADMIN_DATABASE_URL", "postgres://localhost/maissaude"),
            ("ADMIN_BASE_URL", "http://localhost:3001"),
            ("ADMIN_SESSION_SECRET", "h4W!q9Zr#2LmT8&vXp5@Kc7^Nd3*Bf6$"),
        ]);
        map.extend(extra.iter().copied());
        let lookup = |var: &str| map.get(var).map(|v| (*v).to_owned());
        AdminConfig::load(&EnvReader::with_lookup("ADMIN", &lookup))
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.listen.port(), 3001);
        assert!(config.tls.is_none());
        assert!(!config.is_https());
    }

    #[test]
    fn test_tls_enables_https() {
        let config = load(&[("ADMIN_TLS_CERT", "cert"), ("ADMIN_TLS_KEY", "key")]).unwrap();
        assert!(config.is_https());
    }

    #[test]
    fn test_tls_needs_both_halves() {
        let err = load(&[("ADMIN_TLS_CERT", "cert")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(var) if var == "ADMIN_TLS_KEY"));
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = load(&[("ADMIN_SESSION_SECRET", "aaaaaaaaaaaa")]).unwrap_err();
        assert!(matches!(err, ConfigError::WeakSecret { .. }));
    }

    #[test]
    fn test_tls_debug_hides_key() {
        let tls = TlsConfig {
            cert_pem: "-----BEGIN CERTIFICATE-----".to_string(),
            key_pem: SecretString::from("super_private_key"),
        };
        let output = format!("{tls:?}");
        assert!(output.contains("27 bytes"));
        assert!(!output.contains("super_private_key"));
    }
}
