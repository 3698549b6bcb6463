use std::path::PathBuf;
use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

/// Secret used when none is configured outside production.
const DEV_SESSION_SECRET: &str = "inkwell-development-session-secret";

/// Upper bound for `SESSION_MAX_AGE_SECS` (one year).
const MAX_SESSION_AGE_SECS: i64 = 365 * 24 * 60 * 60;

/// Upper bound for `JWT_EXPIRY_MINS` (thirty days).
const MAX_JWT_EXPIRY_MINS: i64 = 30 * 24 * 60;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a valid {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("{0} must be set when APP_ENV=production")]
    MissingSecret(&'static str),
}

/// Deployment environment, read from `APP_ENV` (or `NODE_ENV`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: Option<String>) -> Self {
        match value.as_deref().map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("production") => Environment::Production,
            _ => Environment::Development,
        }
    }
}

/// Session cookie settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Secret the cookie encryption key is derived from.
    pub secret: String,
    /// Cookie lifetime in seconds; never extended by activity.
    pub max_age_secs: i64,
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    pub environment: Environment,
    /// Allowed CORS origins for the JSON API, from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub session: SessionConfig,
    pub jwt: JwtConfig,
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Directory avatars are written to and served from.
    pub upload_dir: PathBuf,
    /// Largest accepted avatar, in bytes.
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                | Default                          |
    /// |------------------------|----------------------------------|
    /// | `HOST`                 | `0.0.0.0`                        |
    /// | `PORT`                 | `3000`                           |
    /// | `APP_ENV` / `NODE_ENV` | `development`                    |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`          |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                             |
    /// | `SESSION_SECRET`       | dev fallback; required in prod   |
    /// | `SESSION_MAX_AGE_SECS` | `86400`                          |
    /// | `JWT_SECRET`           | `SESSION_SECRET`                 |
    /// | `JWT_EXPIRY_MINS`      | `60`                             |
    /// | `DATABASE_URL`         | unset (in-memory store)          |
    /// | `UPLOAD_DIR`           | `uploads`                        |
    /// | `MAX_UPLOAD_BYTES`     | `2097152`                        |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = Environment::parse(get("APP_ENV").or_else(|| get("NODE_ENV")));

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_var(&get, "PORT", "u16", 3000)?;

        let cors_origins: Vec<String> = get("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = parse_var(&get, "REQUEST_TIMEOUT_SECS", "u64", 30)?;

        let session_secret = match get("SESSION_SECRET") {
            Some(secret) => secret,
            None if environment == Environment::Production => {
                return Err(ConfigError::MissingSecret("SESSION_SECRET"));
            }
            None => DEV_SESSION_SECRET.to_string(),
        };
        let session = SessionConfig {
            max_age_secs: parse_lifetime(&get, "SESSION_MAX_AGE_SECS", 86_400, MAX_SESSION_AGE_SECS)?,
            secret: session_secret.clone(),
        };

        let jwt = JwtConfig {
            secret: get("JWT_SECRET").unwrap_or(session_secret),
            expiry_mins: parse_lifetime(&get, "JWT_EXPIRY_MINS", 60, MAX_JWT_EXPIRY_MINS)?,
        };

        Ok(Self {
            host,
            port,
            environment,
            cors_origins,
            request_timeout_secs,
            session,
            jwt,
            database_url: get("DATABASE_URL"),
            upload_dir: PathBuf::from(get("UPLOAD_DIR").unwrap_or_else(|| "uploads".into())),
            max_upload_bytes: parse_var(&get, "MAX_UPLOAD_BYTES", "usize", 2 * 1024 * 1024)?,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// True when the session secret is the built-in development fallback.
    pub fn uses_dev_secret(&self) -> bool {
        self.session.secret == DEV_SESSION_SECRET
    }
}

fn parse_var<T, G>(
    get: &G,
    var: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            var,
            expected,
            value,
        }),
    }
}

/// Parse a positive lifetime no larger than `max`.
fn parse_lifetime<G>(get: &G, var: &'static str, default: i64, max: i64) -> Result<i64, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    const EXPECTED: &str = "positive integer within range";
    let value: i64 = parse_var(get, var, EXPECTED, default)?;
    if value <= 0 || value > max {
        return Err(ConfigError::Invalid {
            var,
            expected: EXPECTED,
            value: value.to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_in_development() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.environment, Environment::Development);
        assert!(config.uses_dev_secret());
        assert_eq!(config.jwt.secret, config.session.secret);
        assert_eq!(config.session.max_age_secs, 86_400);
        assert!(config.database_url.is_none());
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
    }

    #[test]
    fn production_requires_session_secret() {
        let err = load(&[("APP_ENV", "production")]).unwrap_err();
        assert_matches!(err, ConfigError::MissingSecret("SESSION_SECRET"));

        let config = load(&[("NODE_ENV", "production"), ("SESSION_SECRET", "s3cret")]).unwrap();
        assert!(config.is_production());
        assert!(!config.uses_dev_secret());
    }

    #[test]
    fn invalid_numbers_are_reported() {
        let err = load(&[("PORT", "eighty")]).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { var: "PORT", .. });
    }

    #[test]
    fn lifetimes_must_be_positive_and_bounded() {
        for value in ["0", "-5", "9223372036854775807"] {
            let err = load(&[("SESSION_MAX_AGE_SECS", value)]).unwrap_err();
            assert_matches!(err, ConfigError::Invalid { var: "SESSION_MAX_AGE_SECS", .. });

            let err = load(&[("JWT_EXPIRY_MINS", value)]).unwrap_err();
            assert_matches!(err, ConfigError::Invalid { var: "JWT_EXPIRY_MINS", .. });
        }

        let config = load(&[("SESSION_MAX_AGE_SECS", "600"), ("JWT_EXPIRY_MINS", "5")]).unwrap();
        assert_eq!(config.session.max_age_secs, 600);
        assert_eq!(config.jwt.expiry_mins, 5);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = load(&[
            ("PORT", "8080"),
            ("JWT_SECRET", "jwt-only"),
            ("DATABASE_URL", "postgres://localhost/inkwell"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.jwt.secret, "jwt-only");
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/inkwell")
        );
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
    }
}
