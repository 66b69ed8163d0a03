//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; defaults target the production menu backend.
//!
//! - `MENU_HOST` - Bind address (default: 127.0.0.1)
//! - `MENU_PORT` - Listen port (default: 3000)
//! - `MENU_API_BASE_URL` - Menu backend base URL, without trailing slash
//! - `MENU_REFRESH_INTERVAL_SECS` - Sync loop period (default: 60)
//! - `MENU_REQUEST_TIMEOUT_SECS` - Per-request timeout for backend calls (default: 10)
//! - `MENU_WHATSAPP_PHONE` - Destination number for order hand-off, digits only
//! - `MENU_UTC_OFFSET_MINUTES` - Restaurant local offset from UTC (default: -180)
//! - `MENU_SITE_CONFIG_CACHE` - Cached site config file (default: data/site-config.json)
//! - `MENU_COOKIE_SECURE` - Mark the session cookie `Secure` (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use chrono::FixedOffset;
use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "https://backend-menu-production.up.railway.app/api";
const DEFAULT_WHATSAPP_PHONE: &str = "5493755415870";
/// Argentina, UTC-3.
const DEFAULT_UTC_OFFSET_MINUTES: i32 = -180;
const MIN_REFRESH_INTERVAL_SECS: u64 = 5;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Menu backend configuration
    pub menu_api: MenuApiConfig,
    /// How often the sync loop re-fetches the catalog
    pub refresh_interval: Duration,
    /// WhatsApp number orders are handed off to
    pub whatsapp_phone: String,
    /// Restaurant local time offset, used for "today" and "open now"
    pub utc_offset: FixedOffset,
    /// Where the last good site config is cached
    pub site_config_cache: PathBuf,
    /// Whether the session cookie is HTTPS only
    pub cookie_secure: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Menu backend API configuration.
#[derive(Debug, Clone)]
pub struct MenuApiConfig {
    /// Base URL, e.g. `https://backend.example.com/api`
    pub base_url: Url,
    /// Timeout applied to each request
    pub request_timeout: Duration,
}

impl MenuApiConfig {
    /// Build the URL for an endpoint path such as `products`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("MENU_HOST", "127.0.0.1")?;
        let port = parse_env("MENU_PORT", "3000")?;
        let menu_api = MenuApiConfig::from_env()?;

        let refresh_secs: u64 = parse_env("MENU_REFRESH_INTERVAL_SECS", "60")?;
        if refresh_secs < MIN_REFRESH_INTERVAL_SECS {
            return Err(ConfigError::InvalidEnvVar(
                "MENU_REFRESH_INTERVAL_SECS".to_string(),
                format!("must be at least {MIN_REFRESH_INTERVAL_SECS} seconds"),
            ));
        }

        let whatsapp_phone = get_env_or_default("MENU_WHATSAPP_PHONE", DEFAULT_WHATSAPP_PHONE);
        validate_phone(&whatsapp_phone, "MENU_WHATSAPP_PHONE")?;

        let offset_minutes: i32 = parse_env(
            "MENU_UTC_OFFSET_MINUTES",
            &DEFAULT_UTC_OFFSET_MINUTES.to_string(),
        )?;
        let utc_offset = offset_from_minutes(offset_minutes, "MENU_UTC_OFFSET_MINUTES")?;

        Ok(Self {
            host,
            port,
            menu_api,
            refresh_interval: Duration::from_secs(refresh_secs),
            whatsapp_phone,
            utc_offset,
            site_config_cache: PathBuf::from(get_env_or_default(
                "MENU_SITE_CONFIG_CACHE",
                "data/site-config.json",
            )),
            cookie_secure: parse_env("MENU_COOKIE_SECURE", "false")?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl MenuApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_env_or_default("MENU_API_BASE_URL", DEFAULT_API_BASE_URL);
        let base_url = Url::parse(&raw).map_err(|e| {
            ConfigError::InvalidEnvVar("MENU_API_BASE_URL".to_string(), e.to_string())
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "MENU_API_BASE_URL".to_string(),
                "must be an http or https URL".to_string(),
            ));
        }

        let timeout_secs: u64 = parse_env("MENU_REQUEST_TIMEOUT_SECS", "10")?;

        Ok(Self {
            base_url,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// A WhatsApp click-to-chat number is the full international number, digits only.
fn validate_phone(phone: &str, var_name: &str) -> Result<(), ConfigError> {
    if phone.len() < 8 || !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must be an international number with digits only".to_string(),
        ));
    }
    Ok(())
}

/// Convert an offset in minutes to a `FixedOffset`.
fn offset_from_minutes(minutes: i32, var_name: &str) -> Result<FixedOffset, ConfigError> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| {
            ConfigError::InvalidEnvVar(var_name.to_string(), "offset out of range".to_string())
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("5493755415870", "TEST").is_ok());
        assert!(validate_phone("+5493755415870", "TEST").is_err());
        assert!(validate_phone("549 3755", "TEST").is_err());
        assert!(validate_phone("123", "TEST").is_err());
    }

    #[test]
    fn test_offset_from_minutes() {
        assert_eq!(
            offset_from_minutes(-180, "TEST").unwrap(),
            FixedOffset::west_opt(3 * 3600).unwrap()
        );
        assert!(offset_from_minutes(60 * 24, "TEST").is_err());
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let api = MenuApiConfig {
            base_url: Url::parse("https://backend.example.com/api/").unwrap(),
            request_timeout: Duration::from_secs(10),
        };
        assert_eq!(api.endpoint("products"), "https://backend.example.com/api/products");
        assert_eq!(api.endpoint("/site-config"), "https://backend.example.com/api/site-config");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidEnvVar("MENU_PORT".to_string(), "bad".to_string());
        assert_eq!(err.to_string(), "Invalid environment variable MENU_PORT: bad");
    }
}
