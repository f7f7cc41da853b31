//! Environment configuration shared by the storefront and admin binaries.
//!
//! Each binary reads its variables under its own prefix (`STOREFRONT_`,
//! `ADMIN_`). `DATABASE_URL` and the `SENTRY_*` variables are unprefixed so a
//! single `.env` can serve both.
//!
//! Lookups go through an [`EnvReader`], which can be pointed at a map in tests
//! instead of the process environment.

use std::collections::HashMap;
use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

/// Minimum accepted length for signing secrets.
pub const MIN_SECRET_LEN: usize = 32;

/// Minimum Shannon entropy for signing secrets, in bits per character.
pub const MIN_SECRET_ENTROPY: f64 = 3.3;

/// Fragments that give away a copied-from-docs secret (matched lowercase).
const PLACEHOLDER_MARKERS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "senha",
    "troque",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// A variable could not be turned into configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(String),
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },
    #[error("{var} is not usable as a secret: {weakness}")]
    WeakSecret {
        var: String,
        weakness: SecretWeakness,
    },
}

/// Reason a secret was rejected by [`check_secret`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SecretWeakness {
    #[error("only {0} characters, need at least {MIN_SECRET_LEN}")]
    TooShort(usize),
    #[error("looks like a placeholder (contains \"{0}\")")]
    Placeholder(&'static str),
    #[error("entropy is {0:.2} bits/char, need {MIN_SECRET_ENTROPY:.1}; generate it randomly")]
    LowEntropy(f64),
}

/// Reject secrets that are short, copied from documentation, or repetitive.
///
/// # Errors
///
/// Returns the first [`SecretWeakness`] found, checked in that order.
pub fn check_secret(value: &str) -> Result<(), SecretWeakness> {
    let len = value.chars().count();
    if len < MIN_SECRET_LEN {
        return Err(SecretWeakness::TooShort(len));
    }

    let lower = value.to_lowercase();
    if let Some(marker) = PLACEHOLDER_MARKERS.iter().find(|m| lower.contains(*m)) {
        return Err(SecretWeakness::Placeholder(*marker));
    }

    let entropy = entropy_per_char(value);
    if entropy < MIN_SECRET_ENTROPY {
        return Err(SecretWeakness::LowEntropy(entropy));
    }
    Ok(())
}

/// Shannon entropy of the character distribution, in bits per character.
#[must_use]
pub fn entropy_per_char(value: &str) -> f64 {
    let mut counts: HashMap<char, u32> = HashMap::new();
    let mut total = 0_u32;
    for c in value.chars() {
        *counts.entry(c).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }

    let total = f64::from(total);
    counts
        .values()
        .map(|&n| {
            let p = f64::from(n) / total;
            -p * p.log2()
        })
        .sum()
}

type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn process_env(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

/// Reads prefixed variables, treating empty values as unset.
pub struct EnvReader<'a> {
    prefix: &'a str,
    lookup: Lookup<'a>,
}

impl EnvReader<'static> {
    /// Read from the process environment.
    #[must_use]
    pub fn process(prefix: &'static str) -> Self {
        Self {
            prefix,
            lookup: &process_env,
        }
    }
}

impl<'a> EnvReader<'a> {
    /// Read through a custom lookup, e.g. a map in tests.
    #[must_use]
    pub fn with_lookup(prefix: &'a str, lookup: Lookup<'a>) -> Self {
        Self { prefix, lookup }
    }

    /// Full variable name for `key`, e.g. `ADMIN_PORT` for `PORT`.
    #[must_use]
    pub fn var(&self, key: &str) -> String {
        format!("{}_{key}", self.prefix)
    }

    fn raw(&self, var: &str) -> Option<String> {
        (self.lookup)(var).filter(|v| !v.trim().is_empty())
    }

    /// Prefixed variable, if set.
    #[must_use]
    pub fn optional(&self, key: &str) -> Option<String> {
        self.raw(&self.var(key))
    }

    /// Unprefixed variable, if set.
    #[must_use]
    pub fn shared(&self, var: &str) -> Option<String> {
        self.raw(var)
    }

    /// Prefixed variable that must be set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if it is unset or empty.
    pub fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::Missing(self.var(key)))
    }

    /// Prefixed variable parsed as `T`, or `default` when unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the value does not parse.
    pub fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let var = self.var(key);
        parse_var(&var, self.raw(&var), default)
    }

    /// `{PREFIX}_HOST` and `{PREFIX}_PORT`, defaulting to loopback.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for a malformed host or port.
    pub fn listen_addr(&self, default_port: u16) -> Result<SocketAddr, ConfigError> {
        let host: IpAddr = self.parsed_or("HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?;
        let port: u16 = self.parsed_or("PORT", default_port)?;
        Ok(SocketAddr::new(host, port))
    }

    /// `{PREFIX}_DATABASE_URL`, falling back to `DATABASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` naming the prefixed variable.
    pub fn database_url(&self) -> Result<SecretString, ConfigError> {
        self.optional("DATABASE_URL")
            .or_else(|| self.shared("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::Missing(self.var("DATABASE_URL")))
    }

    /// Required absolute URL, returned without a trailing slash.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` or `ConfigError::Invalid`.
    pub fn url(&self, key: &str) -> Result<String, ConfigError> {
        let value = self.required(key)?;
        url::Url::parse(&value).map_err(|e| ConfigError::Invalid {
            var: self.var(key),
            reason: e.to_string(),
        })?;
        Ok(value.trim_end_matches('/').to_owned())
    }

    /// Required secret that passes [`check_secret`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` or `ConfigError::WeakSecret`.
    pub fn secret(&self, key: &str) -> Result<SecretString, ConfigError> {
        let value = self.required(key)?;
        check_secret(&value).map_err(|weakness| ConfigError::WeakSecret {
            var: self.var(key),
            weakness,
        })?;
        Ok(SecretString::from(value))
    }
}

fn parse_var<T>(var: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.map_or(Ok(default), |value| {
        value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var: var.to_owned(),
            reason: e.to_string(),
        })
    })
}

/// Error reporting settings from the unprefixed `SENTRY_*` variables.
#[derive(Debug, Clone, PartialEq)]
pub struct SentryConfig {
    /// Reporting is off when no DSN is set.
    pub dsn: Option<String>,
    pub environment: Option<String>,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
}

impl SentryConfig {
    /// Load `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE` (default
    /// 1.0) and `SENTRY_TRACES_SAMPLE_RATE` (default `traces_default`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for a rate that is not a number in
    /// `0.0..=1.0`.
    pub fn load(env: &EnvReader<'_>, traces_default: f32) -> Result<Self, ConfigError> {
        Ok(Self {
            dsn: env.shared("SENTRY_DSN"),
            environment: env.shared("SENTRY_ENVIRONMENT"),
            sample_rate: rate(env, "SENTRY_SAMPLE_RATE", 1.0)?,
            traces_sample_rate: rate(env, "SENTRY_TRACES_SAMPLE_RATE", traces_default)?,
        })
    }
}

fn rate(env: &EnvReader<'_>, var: &str, default: f32) -> Result<f32, ConfigError> {
    let value: f32 = parse_var(var, env.shared(var), default)?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            var: var.to_owned(),
            reason: format!("{value} is outside 0.0..=1.0"),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    const STRONG: &str = "Vq7#pL2!xR9@mK4$tN8^wB3&zH6*cF1%";

    fn with_vars<R>(vars: &[(&str, &str)], f: impl FnOnce(&EnvReader<'_>) -> R) -> R {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        let lookup = move |var: &str| map.get(var).cloned();
        f(&EnvReader::with_lookup("LOJA", &lookup))
    }

    #[test]
    fn test_entropy() {
        assert!(entropy_per_char("").abs() < f64::EPSILON);
        assert!(entropy_per_char("zzzz").abs() < f64::EPSILON);
        assert!((entropy_per_char("ab") - 1.0).abs() < 1e-9);
        assert!(entropy_per_char(STRONG) > MIN_SECRET_ENTROPY);
    }

    #[test]
    fn test_check_secret() {
        assert_eq!(check_secret("curta"), Err(SecretWeakness::TooShort(5)));
        assert_eq!(
            check_secret("troque-esta-chave-antes-do-deploy-01"),
            Err(SecretWeakness::Placeholder("troque"))
        );
        assert!(matches!(
            check_secret(&"ab".repeat(20)),
            Err(SecretWeakness::LowEntropy(_))
        ));
        assert_eq!(check_secret(STRONG), Ok(()));
    }

    #[test]
    fn test_prefix_and_empty_values() {
        with_vars(&[("LOJA_NAME", "Mais Saúde"), ("LOJA_EMPTY", "  ")], |env| {
            assert_eq!(env.var("PORT"), "LOJA_PORT");
            assert_eq!(env.optional("NAME").as_deref(), Some("Mais Saúde"));
            assert_eq!(env.optional("EMPTY"), None);
            assert!(matches!(env.required("EMPTY"), Err(ConfigError::Missing(v)) if v == "LOJA_EMPTY"));
        });
    }

    #[test]
    fn test_listen_addr() {
        with_vars(&[], |env| {
            assert_eq!(env.listen_addr(3000).unwrap().to_string(), "127.0.0.1:3000");
        });
        with_vars(&[("LOJA_HOST", "0.0.0.0"), ("LOJA_PORT", "8080")], |env| {
            assert_eq!(env.listen_addr(3000).unwrap().to_string(), "0.0.0.0:8080");
        });
        with_vars(&[("LOJA_PORT", "porta")], |env| {
            assert!(matches!(
                env.listen_addr(3000),
                Err(ConfigError::Invalid { var, .. }) if var == "LOJA_PORT"
            ));
        });
    }

    #[test]
    fn test_database_url_fallback() {
        with_vars(&[("DATABASE_URL", "postgres://geral")], |env| {
            assert_eq!(env.database_url().unwrap().expose_secret(), "postgres://geral");
        });
        with_vars(
            &[("DATABASE_URL", "postgres://geral"), ("LOJA_DATABASE_URL", "postgres://loja")],
            |env| assert_eq!(env.database_url().unwrap().expose_secret(), "postgres://loja"),
        );
        with_vars(&[], |env| {
            assert!(matches!(env.database_url(), Err(ConfigError::Missing(v)) if v == "LOJA_DATABASE_URL"));
        });
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        with_vars(&[("LOJA_BASE_URL", "https://maissaude.com.br/")], |env| {
            assert_eq!(env.url("BASE_URL").unwrap(), "https://maissaude.com.br");
        });
        with_vars(&[("LOJA_BASE_URL", "maissaude")], |env| {
            assert!(matches!(env.url("BASE_URL"), Err(ConfigError::Invalid { .. })));
        });
    }

    #[test]
    fn test_secret() {
        with_vars(&[("LOJA_SESSION_SECRET", STRONG)], |env| {
            assert_eq!(env.secret("SESSION_SECRET").unwrap().expose_secret(), STRONG);
        });
        with_vars(&[("LOJA_SESSION_SECRET", "changeme")], |env| {
            assert!(matches!(
                env.secret("SESSION_SECRET"),
                Err(ConfigError::WeakSecret { weakness: SecretWeakness::TooShort(8), .. })
            ));
        });
    }

    #[test]
    fn test_sentry_config() {
        with_vars(&[], |env| {
            let sentry = SentryConfig::load(env, 0.1).unwrap();
            assert_eq!(sentry.dsn, None);
            assert!((sentry.sample_rate - 1.0).abs() < f32::EPSILON);
            assert!((sentry.traces_sample_rate - 0.1).abs() < f32::EPSILON);
        });
        with_vars(&[("SENTRY_SAMPLE_RATE", "1.5")], |env| {
            assert!(SentryConfig::load(env, 0.1).is_err());
        });
    }
}
