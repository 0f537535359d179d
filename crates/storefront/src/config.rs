//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_API_URL` - Base URL of the storefront API (serves `/products` and `/stock`)
//!
//! ## Optional
//! - `STOREFRONT_API_TOKEN` - Bearer token sent with every API request
//! - `STOREFRONT_STORAGE_DIR` - Directory holding persisted slots (default: .rocketshoes)
//! - `STOREFRONT_CART_KEY` - Storage key of the cart slot (default: @RocketShoes:cart)
//! - `STOREFRONT_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `STOREFRONT_PRODUCT_CACHE_TTL_SECS` - Product cache lifetime (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default storage key for the persisted cart.
pub const DEFAULT_CART_KEY: &str = "@RocketShoes:cart";

const DEFAULT_STORAGE_DIR: &str = ".rocketshoes";
const DEFAULT_HTTP_TIMEOUT_SECS: &str = "10";
const DEFAULT_PRODUCT_CACHE_TTL_SECS: &str = "300";

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
    /// Storefront API configuration
    pub api: StorefrontApiConfig,
    /// Cart persistence configuration
    pub storage: StorageConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Storefront API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct StorefrontApiConfig {
    /// Base URL, always ending in `/` so relative paths join beneath it
    pub base_url: Url,
    /// Optional bearer token
    pub access_token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
    /// How long product records stay cached
    pub product_cache_ttl: Duration,
}

impl std::fmt::Debug for StorefrontApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout", &self.timeout)
            .field("product_cache_ttl", &self.product_cache_ttl)
            .finish()
    }
}

/// Cart persistence configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding one file per storage key
    pub dir: PathBuf,
    /// Key of the cart slot
    pub cart_key: String,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        Ok(Self {
            api: StorefrontApiConfig::from_env(&env)?,
            storage: StorageConfig::from_env(&env),
            sentry_dsn: env.optional("SENTRY_DSN"),
        })
    }
}

impl StorefrontApiConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        let raw_url = env.required("STOREFRONT_API_URL")?;
        let base_url = parse_base_url(&raw_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_API_URL".to_string(), e.to_string())
        })?;

        Ok(Self {
            base_url,
            access_token: env.optional("STOREFRONT_API_TOKEN").map(SecretString::from),
            timeout: env.seconds("STOREFRONT_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?,
            product_cache_ttl: env.seconds(
                "STOREFRONT_PRODUCT_CACHE_TTL_SECS",
                DEFAULT_PRODUCT_CACHE_TTL_SECS,
            )?,
        })
    }

    /// Config pointing at `base_url` with default timeouts and no token.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL.
    pub fn for_base_url(base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            access_token: None,
            timeout: Duration::from_secs(10),
            product_cache_ttl: Duration::from_secs(300),
        })
    }
}

impl StorageConfig {
    fn from_env(env: &Env<'_>) -> Self {
        Self {
            dir: PathBuf::from(env.or_default("STOREFRONT_STORAGE_DIR", DEFAULT_STORAGE_DIR)),
            cart_key: env.or_default("STOREFRONT_CART_KEY", DEFAULT_CART_KEY),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a base URL, appending the trailing slash `Url::join` needs.
fn parse_base_url(raw: &str) -> Result<Url, url::ParseError> {
    let trimmed = raw.trim();
    if trimmed.ends_with('/') {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("{trimmed}/"))
    }
}

/// Variable source wrapper.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable. Empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get a whole number of seconds.
    fn seconds(&self, key: &str, default: &str) -> Result<Duration, ConfigError> {
        self.or_default(key, default)
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_missing_api_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "STOREFRONT_API_URL"));
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("STOREFRONT_API_URL", "http://localhost:3333")]).unwrap();

        assert_eq!(config.api.base_url.as_str(), "http://localhost:3333/");
        assert!(config.api.access_token.is_none());
        assert_eq!(config.api.timeout, Duration::from_secs(10));
        assert_eq!(config.api.product_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.storage.dir, PathBuf::from(".rocketshoes"));
        assert_eq!(config.storage.cart_key, DEFAULT_CART_KEY);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_base_url_keeps_path_prefix() {
        let config = load(&[("STOREFRONT_API_URL", "https://api.example.com/v1")]).unwrap();
        let joined = config.api.base_url.join("stock/3").unwrap();
        assert_eq!(joined.as_str(), "https://api.example.com/v1/stock/3");
    }

    #[test]
    fn test_invalid_api_url() {
        let err = load(&[("STOREFRONT_API_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "STOREFRONT_API_URL"));
    }

    #[test]
    fn test_invalid_timeout() {
        let err = load(&[
            ("STOREFRONT_API_URL", "http://localhost:3333"),
            ("STOREFRONT_HTTP_TIMEOUT_SECS", "soon"),
        ])
        .unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "STOREFRONT_HTTP_TIMEOUT_SECS")
        );
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("STOREFRONT_API_URL", "http://localhost:3333/"),
            ("STOREFRONT_API_TOKEN", "tok_live_8fJ2kq"),
            ("STOREFRONT_STORAGE_DIR", "/var/lib/rocketshoes"),
            ("STOREFRONT_CART_KEY", "cart-v2"),
            ("STOREFRONT_HTTP_TIMEOUT_SECS", "3"),
            ("STOREFRONT_PRODUCT_CACHE_TTL_SECS", "0"),
            ("SENTRY_DSN", "https://key@sentry.example.com/1"),
        ])
        .unwrap();

        assert_eq!(
            config.api.access_token.as_ref().unwrap().expose_secret(),
            "tok_live_8fJ2kq"
        );
        assert_eq!(config.storage.dir, PathBuf::from("/var/lib/rocketshoes"));
        assert_eq!(config.storage.cart_key, "cart-v2");
        assert_eq!(config.api.timeout, Duration::from_secs(3));
        assert_eq!(config.api.product_cache_ttl, Duration::ZERO);
        assert!(config.sentry_dsn.is_some());
    }

    #[test]
    fn test_empty_token_is_unset() {
        let config = load(&[
            ("STOREFRONT_API_URL", "http://localhost:3333"),
            ("STOREFRONT_API_TOKEN", "  "),
        ])
        .unwrap();
        assert!(config.api.access_token.is_none());
    }

    #[test]
    fn test_api_config_debug_redacts_token() {
        let mut config = StorefrontApiConfig::for_base_url("http://localhost:3333").unwrap();
        config.access_token = Some(SecretString::from("super_secret_api_token"));

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("http://localhost:3333/"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_api_token"));
    }
}
