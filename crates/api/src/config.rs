//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `ICECREAM_REDIS_URL` - Redis connection string (falls back to `REDIS_URL`,
//!   then `redis://127.0.0.1:6379`); `memory://` selects an in-process store
//! - `ICECREAM_HOST` - Bind address (default: 127.0.0.1)
//! - `ICECREAM_PORT` - Listen port (default: 8000)
//! - `ICECREAM_STATIC_URL` - Public URL prefix for mirrored images (default: /static)
//! - `ICECREAM_STATIC_ROOT` - Filesystem root for mirrored images (default: static)
//! - `ICECREAM_MIRROR_IMAGES` - Download product images on creation (default: false)
//! - `ICECREAM_STORE_TIMEOUT_MS` - Per-call store timeout (default: 2000)
//! - `ICECREAM_STORE_RETRIES` - Reconnect attempts for the store (default: 3)
//! - `ICECREAM_PASSWORD_SCHEME` - `argon2` (default) or `sha256-legacy`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//!
//! The server binary also reads `ICECREAM_LOG_JSON` (JSON log lines) and
//! `RUST_LOG` directly.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// How new password hashes are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PasswordScheme {
    /// Salted Argon2id, stored as a PHC string.
    #[default]
    Argon2,
    /// Unsalted SHA-256 hex digest. Insecure.
    Sha256Legacy,
}

impl FromStr for PasswordScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "argon2" | "argon2id" => Ok(Self::Argon2),
            "sha256-legacy" | "sha256" => Ok(Self::Sha256Legacy),
            other => Err(format!("unknown password scheme '{other}'")),
        }
    }
}

/// Key-value store connection settings.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Redis connection URL (may contain a password)
    pub url: SecretString,
    /// Upper bound for a single store call
    pub timeout: Duration,
    /// Reconnect attempts before a call fails
    pub retries: usize,
}

/// Static asset settings used by the image mirror.
#[derive(Debug, Clone)]
pub struct StaticConfig {
    /// Public URL prefix under which mirrored files are served
    pub public_url: String,
    /// Filesystem directory mirrored files are written to
    pub root: PathBuf,
    /// Whether product images are downloaded on creation
    pub mirror_images: bool,
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Key-value store settings
    pub store: StoreConfig,
    /// Static asset settings
    pub statics: StaticConfig,
    /// Scheme for new password hashes
    pub password_scheme: PasswordScheme,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("ICECREAM_HOST", "127.0.0.1")?;
        let port = parse_env("ICECREAM_PORT", "8000")?;

        let store = StoreConfig {
            url: get_redis_url("ICECREAM_REDIS_URL"),
            timeout: Duration::from_millis(parse_env("ICECREAM_STORE_TIMEOUT_MS", "2000")?),
            retries: parse_env("ICECREAM_STORE_RETRIES", "3")?,
        };

        let statics = StaticConfig {
            public_url: normalize_prefix(&get_env_or_default("ICECREAM_STATIC_URL", "/static")),
            root: PathBuf::from(get_env_or_default("ICECREAM_STATIC_ROOT", "static")),
            mirror_images: parse_bool("ICECREAM_MIRROR_IMAGES", false)?,
        };

        let password_scheme = parse_env("ICECREAM_PASSWORD_SCHEME", "argon2")?;

        Ok(Self {
            host,
            port,
            store,
            statics,
            password_scheme,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get Redis URL with fallback to generic `REDIS_URL`, then the local default.
fn get_redis_url(primary_key: &str) -> SecretString {
    let value = std::env::var(primary_key)
        .or_else(|_| std::env::var("REDIS_URL"))
        .unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string());
    SecretString::from(value)
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to a default literal.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a boolean flag (`true`/`false`/`1`/`0`/`yes`/`no`).
fn parse_bool(key: &str, default: bool) -> Result<bool, ConfigError> {
    std::env::var(key).map_or(Ok(default), |raw| parse_flag(key, &raw))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

/// Strip trailing slashes so paths can be appended with `/`.
fn normalize_prefix(prefix: &str) -> String {
    prefix.trim_end_matches('/').to_string()
}
