//! Proxy configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `RYE_AUTH_HEADER` - Value of the `Authorization` header sent to Rye
//!   (e.g., `Basic <key>` from console.rye.com)
//!
//! ## Optional
//! - `PROXY_HOST` - Bind address (default: 127.0.0.1)
//! - `PROXY_PORT` - Listen port (default: 4000)
//! - `RYE_API_ENDPOINT` - GraphQL endpoint (default: <https://graphql.api.rye.com/v1/query>)
//! - `RYE_SHOPPER_IP` - Value of the `Rye-Shopper-IP` header (default: empty)
//! - `RYE_PAYMENT_TOKEN` - Payment token used when submitting carts
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_RYE_ENDPOINT: &str = "https://graphql.api.rye.com/v1/query";
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "xxx",
    "todo",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Proxy application configuration.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Rye GraphQL API configuration
    pub rye: RyeConfig,
    /// Payment token for cart submission (placeholder when unset)
    pub payment_token: Option<SecretString>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Rye GraphQL API configuration.
///
/// Implements `Debug` manually to redact the authorization header.
#[derive(Clone)]
pub struct RyeConfig {
    /// GraphQL endpoint every mutation is posted to
    pub endpoint: Url,
    /// `Authorization` header value
    pub auth_header: SecretString,
    /// `Rye-Shopper-IP` header value
    pub shopper_ip: String,
}

impl std::fmt::Debug for RyeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RyeConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("auth_header", &"[REDACTED]")
            .field("shopper_ip", &self.shopper_ip)
            .finish()
    }
}

impl ProxyConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the Rye authorization header looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("PROXY_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("PROXY_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PROXY_PORT", "4000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PROXY_PORT".to_string(), e.to_string()))?;

        Ok(Self {
            host,
            port,
            rye: RyeConfig::from_env()?,
            payment_token: get_optional_env("RYE_PAYMENT_TOKEN").map(SecretString::from),
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

impl RyeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let endpoint = parse_endpoint(
            "RYE_API_ENDPOINT",
            &get_env_or_default("RYE_API_ENDPOINT", DEFAULT_RYE_ENDPOINT),
        )?;

        Ok(Self {
            endpoint,
            auth_header: get_validated_secret("RYE_AUTH_HEADER")?,
            shopper_ip: get_env_or_default("RYE_SHOPPER_IP", ""),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an absolute http(s) URL.
fn parse_endpoint(var_name: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(url)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that an authorization header carries a real credential.
///
/// The scheme prefix (`Basic`, `Bearer`) is ignored; only the credential is
/// checked against the placeholder blocklist and the entropy floor.
fn validate_auth_header(header: &str, var_name: &str) -> Result<(), ConfigError> {
    let credential = header
        .split_once(' ')
        .map_or(header, |(_, rest)| rest)
        .trim();

    if credential.is_empty() {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            "credential is empty".to_string(),
        ));
    }

    let lower = credential.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(credential);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

/// Load and validate an authorization header from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_auth_header(&value, key)?;
    Ok(SecretString::from(value))
}
