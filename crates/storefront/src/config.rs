//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `ATELIER_HOST` - Bind address (default: 127.0.0.1)
//! - `ATELIER_PORT` - Listen port (default: 3000)
//! - `ATELIER_DATA_DIR` - Directory holding `products.json` and the record
//!   collections (default: `data`)
//! - `ATELIER_SECURE_COOKIES` - Mark the token cookie `Secure` (default: false)
//! - `ATELIER_RATE_LIMIT` - Rate-limit auth endpoints (default: true)
//! - `ATELIER_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable output for local development.
    #[default]
    Pretty,
    /// One JSON object per line for log shipping.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected 'pretty' or 'json', got '{other}'")),
        }
    }
}

/// Sentry error tracking configuration.
#[derive(Debug, Clone)]
pub struct SentryConfig {
    /// Sentry DSN (contains the project key)
    pub dsn: Option<SecretString>,
    /// Environment tag (e.g., production, staging)
    pub environment: Option<String>,
    /// Error event sample rate
    pub sample_rate: f32,
    /// Performance trace sample rate
    pub traces_sample_rate: f32,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            environment: None,
            sample_rate: 1.0,
            traces_sample_rate: 0.0,
        }
    }
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory with the catalog and record collections
    pub data_dir: PathBuf,
    /// Whether the token cookie carries the `Secure` attribute
    pub secure_cookies: bool,
    /// Whether auth endpoints are rate limited
    pub rate_limit: bool,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry configuration
    pub sentry: SentryConfig,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            data_dir: PathBuf::from("data"),
            secure_cookies: false,
            rate_limit: true,
            log_format: LogFormat::Pretty,
            sentry: SentryConfig::default(),
        }
    }
}

impl StorefrontConfig {
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

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = parse_var("ATELIER_HOST", &get("ATELIER_HOST", "127.0.0.1"))?;
        let port = parse_var("ATELIER_PORT", &get("ATELIER_PORT", "3000"))?;
        let data_dir = PathBuf::from(get("ATELIER_DATA_DIR", "data"));
        let secure_cookies = parse_bool(
            "ATELIER_SECURE_COOKIES",
            &get("ATELIER_SECURE_COOKIES", "false"),
        )?;
        let rate_limit = parse_bool("ATELIER_RATE_LIMIT", &get("ATELIER_RATE_LIMIT", "true"))?;
        let log_format = parse_var("ATELIER_LOG_FORMAT", &get("ATELIER_LOG_FORMAT", "pretty"))?;

        let sentry = SentryConfig {
            dsn: lookup("SENTRY_DSN")
                .filter(|dsn| !dsn.trim().is_empty())
                .map(SecretString::from),
            environment: lookup("SENTRY_ENVIRONMENT"),
            sample_rate: parse_rate("SENTRY_SAMPLE_RATE", &get("SENTRY_SAMPLE_RATE", "1.0"))?,
            traces_sample_rate: parse_rate(
                "SENTRY_TRACES_SAMPLE_RATE",
                &get("SENTRY_TRACES_SAMPLE_RATE", "0.0"),
            )?,
        };

        Ok(Self {
            host,
            port,
            data_dir,
            secure_cookies,
            rate_limit,
            log_format,
            sentry,
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

/// Parse a variable with its `FromStr` implementation.
fn parse_var<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a boolean flag (`true/false`, `1/0`, `yes/no`).
fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

/// Parse a sample rate in `0.0..=1.0`.
fn parse_rate(key: &str, value: &str) -> Result<f32, ConfigError> {
    let rate: f32 = parse_var(key, value)?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(rate)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert!(!config.secure_cookies);
        assert!(config.rate_limit);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.sentry.dsn.is_none());
        assert!((config.sentry.sample_rate - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_overrides() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            ("ATELIER_HOST", "0.0.0.0"),
            ("ATELIER_PORT", "8080"),
            ("ATELIER_DATA_DIR", "/var/lib/atelier"),
            ("ATELIER_SECURE_COOKIES", "yes"),
            ("ATELIER_RATE_LIMIT", "0"),
            ("ATELIER_LOG_FORMAT", "JSON"),
            ("SENTRY_DSN", "https://key@sentry.example/1"),
            ("SENTRY_TRACES_SAMPLE_RATE", "0.25"),
        ]))
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/atelier"));
        assert!(config.secure_cookies);
        assert!(!config.rate_limit);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.sentry.dsn.as_ref().unwrap().expose_secret(),
            "https://key@sentry.example/1"
        );
        assert!((config.sentry.traces_sample_rate - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_invalid_port_rejected() {
        let result = StorefrontConfig::from_lookup(lookup(&[("ATELIER_PORT", "http")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(key, _)) if key == "ATELIER_PORT"));
    }

    #[test]
    fn test_invalid_bool_rejected() {
        let result = StorefrontConfig::from_lookup(lookup(&[("ATELIER_RATE_LIMIT", "maybe")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_sample_rate_out_of_range() {
        let result = StorefrontConfig::from_lookup(lookup(&[("SENTRY_SAMPLE_RATE", "1.5")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_dsn_disables_sentry() {
        let config = StorefrontConfig::from_lookup(lookup(&[("SENTRY_DSN", "  ")])).unwrap();
        assert!(config.sentry.dsn.is_none());
    }

    #[test]
    fn test_debug_redacts_dsn() {
        let config = StorefrontConfig::from_lookup(lookup(&[(
            "SENTRY_DSN",
            "https://super-secret-key@sentry.example/1",
        )]))
        .unwrap();
        assert!(!format!("{config:?}").contains("super-secret-key"));
    }
}
