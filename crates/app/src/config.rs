//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! ## Server
//! - `CUSTOMER_DESK_HOST` - Bind address (default: 127.0.0.1)
//! - `CUSTOMER_DESK_PORT` - Listen port (default: 3000)
//! - `CUSTOMER_DESK_LOG_JSON` - Emit JSON logs when set to `1`/`true`
//!
//! ## Storage
//! - `CUSTOMER_DESK_DATA_DIR` - Directory holding local storage (default: .customer-desk)
//! - `CUSTOMER_DESK_STORAGE_KEY` - Key the customer collection is stored under (default: customers)
//!
//! ## Lookups
//! - `LOOKUP_BASE_URL` - Base URL of the PAN/postcode service
//!   (default: <https://lab.pixel6.co/api>)
//! - `LOOKUP_TIMEOUT_SECS` - Per-request timeout (default: 10)
//!
//! ## Forms
//! - `FORM_IDLE_TIMEOUT_SECS` - Idle time before an open form is discarded (default: 1800)
//! - `FORM_MAX_SESSIONS` - Maximum number of open forms (default: 1000)
//!
//! ## Error tracking
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate, 0.0 to 1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const DEFAULT_LOOKUP_BASE_URL: &str = "https://lab.pixel6.co/api";
pub const DEFAULT_STORAGE_KEY: &str = "customers";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Emit JSON-formatted logs
    pub log_json: bool,
    /// Local storage configuration
    pub storage: StorageConfig,
    /// Remote lookup configuration
    pub lookup: LookupConfig,
    /// Open form session limits
    pub forms: FormSessionConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Where the customer collection lives.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding one file per storage key
    pub data_dir: PathBuf,
    /// Key the customer collection is stored under
    pub key: String,
}

/// PAN verification and postcode lookup service.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    /// Base URL; endpoint paths are appended to it
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_LOOKUP_BASE_URL).expect("Invalid default lookup URL"),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Limits for server-held form sessions.
#[derive(Debug, Clone, Copy)]
pub struct FormSessionConfig {
    /// Idle time after which an open form is dropped
    pub idle_timeout: Duration,
    /// Maximum number of concurrently open forms
    pub max_sessions: u64,
}

impl Default for FormSessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(1800),
            max_sessions: 1000,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or_default("CUSTOMER_DESK_HOST", "127.0.0.1")?;
        let port = parse_env_or_default("CUSTOMER_DESK_PORT", "3000")?;
        let log_json = get_optional_env("CUSTOMER_DESK_LOG_JSON")
            .is_some_and(|v| matches!(v.as_str(), "1" | "true"));

        Ok(Self {
            host,
            port,
            log_json,
            storage: StorageConfig::from_env()?,
            lookup: LookupConfig::from_env()?,
            forms: FormSessionConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_rate("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_rate("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl StorageConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let data_dir = PathBuf::from(get_env_or_default(
            "CUSTOMER_DESK_DATA_DIR",
            ".customer-desk",
        ));
        let key = get_env_or_default("CUSTOMER_DESK_STORAGE_KEY", DEFAULT_STORAGE_KEY);
        validate_storage_key(&key, "CUSTOMER_DESK_STORAGE_KEY")?;
        Ok(Self { data_dir, key })
    }
}

impl LookupConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_env_or_default("LOOKUP_BASE_URL", DEFAULT_LOOKUP_BASE_URL);
        let base_url = parse_base_url(&raw, "LOOKUP_BASE_URL")?;
        let secs: u64 = parse_env_or_default("LOOKUP_TIMEOUT_SECS", "10")?;
        Ok(Self {
            base_url,
            timeout: Duration::from_secs(secs),
        })
    }
}

impl FormSessionConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let idle: u64 = parse_env_or_default("FORM_IDLE_TIMEOUT_SECS", "1800")?;
        Ok(Self {
            idle_timeout: Duration::from_secs(idle),
            max_sessions: parse_env_or_default("FORM_MAX_SESSIONS", "1000")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a sample rate and check it lies in `0.0..=1.0`.
fn parse_rate(key: &str, default: &str) -> Result<f32, ConfigError> {
    let rate: f32 = parse_env_or_default(key, default)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ))
    }
}

/// Parse the lookup base URL; only http(s) is accepted.
fn parse_base_url(raw: &str, var_name: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Storage keys become file names, so only a plain stem is allowed.
fn validate_storage_key(key: &str, var_name: &str) -> Result<(), ConfigError> {
    let plain = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if plain {
        Ok(())
    } else {
        Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "may only contain letters, digits, '-' and '_'".to_string(),
        ))
    }
}
