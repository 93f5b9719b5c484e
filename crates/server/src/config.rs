//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BRAMBLE_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`; startup fails when neither is set)
//!
//! ## Optional
//! - `BRAMBLE_HOST` - Bind address (default: 127.0.0.1)
//! - `BRAMBLE_PORT` - Listen port (default: 3000)
//! - `BRAMBLE_BASE_URL` - Public URL (default: http://localhost:3000;
//!   an https scheme marks the session cookie as secure)
//! - `BRAMBLE_SESSION_SECRET` - Session secret (min 32 chars; a built-in
//!   development value is used when unset)
//! - `BRAMBLE_RESPONSE_MODE` - `pages` (redirects + rendered views, default)
//!   or `json` (structured bodies)
//! - `BRAMBLE_STORE_TIMEOUT_SECS` - Upper bound on any single store call
//!   (default: 5)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;

/// Development-only session secret used when `BRAMBLE_SESSION_SECRET` is
/// unset. Long enough to satisfy the length check; main logs a warning when
/// it is in effect.
const DEFAULT_SESSION_SECRET: &str = "bramble-development-session-secret-not-for-production";

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

/// How handlers shape their responses.
///
/// The same routes serve both a browser-facing variant (redirects and
/// rendered views) and a JSON API variant (status codes and structured
/// bodies). The mode is fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// Redirect-and-render responses for browsers.
    Pages,
    /// Structured JSON responses.
    Json,
}

impl ResponseMode {
    fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("pages") {
            Some(Self::Pages)
        } else if s.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else {
            None
        }
    }
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: String,
    /// Session secret
    pub session_secret: SecretString,
    /// Response shaping mode
    pub response_mode: ResponseMode,
    /// Upper bound on any single store call
    pub store_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the database URL is missing, a variable
    /// fails to parse, or an explicitly set session secret is too short.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("BRAMBLE_DATABASE_URL")?;
        let host = get_env_or_default("BRAMBLE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("BRAMBLE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("BRAMBLE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("BRAMBLE_PORT".to_string(), e.to_string()))?;
        let base_url = get_env_or_default("BRAMBLE_BASE_URL", "http://localhost:3000");

        let session_secret = match get_optional_env("BRAMBLE_SESSION_SECRET") {
            Some(value) => {
                let secret = SecretString::from(value);
                validate_session_secret(&secret, "BRAMBLE_SESSION_SECRET")?;
                secret
            }
            None => SecretString::from(DEFAULT_SESSION_SECRET),
        };

        let response_mode = {
            let raw = get_env_or_default("BRAMBLE_RESPONSE_MODE", "pages");
            ResponseMode::parse(&raw).ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "BRAMBLE_RESPONSE_MODE".to_string(),
                    format!("expected 'pages' or 'json', got '{raw}'"),
                )
            })?
        };

        let store_timeout_secs = get_env_or_default("BRAMBLE_STORE_TIMEOUT_SECS", "5")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BRAMBLE_STORE_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            response_mode,
            store_timeout: Duration::from_secs(store_timeout_secs),
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the built-in development session secret is in effect.
    #[must_use]
    pub fn session_secret_is_default(&self) -> bool {
        self.session_secret.expose_secret() == DEFAULT_SESSION_SECRET
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL` (used by PaaS
/// postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    // Try primary key first (e.g., BRAMBLE_DATABASE_URL)
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    // Fallback to generic DATABASE_URL
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_response_mode_parse() {
        assert_eq!(ResponseMode::parse("pages"), Some(ResponseMode::Pages));
        assert_eq!(ResponseMode::parse("json"), Some(ResponseMode::Json));
        assert_eq!(ResponseMode::parse("JSON"), Some(ResponseMode::Json));
        assert_eq!(ResponseMode::parse("html"), None);
        assert_eq!(ResponseMode::parse(""), None);
    }

    #[test]
    fn test_validate_session_secret_too_short() {
        let secret = SecretString::from("short");
        let result = validate_session_secret(&secret, "TEST_SESSION");
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_session_secret_valid_length() {
        let secret = SecretString::from("x".repeat(32));
        let result = validate_session_secret(&secret, "TEST_SESSION");
        assert!(result.is_ok());
    }

    #[test]
    fn test_default_session_secret_passes_validation() {
        let secret = SecretString::from(DEFAULT_SESSION_SECRET);
        assert!(validate_session_secret(&secret, "TEST_SESSION").is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            response_mode: ResponseMode::Pages,
            store_timeout: Duration::from_secs(5),
            sentry_dsn: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_session_secret_is_default() {
        let mut config = ServerConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from(DEFAULT_SESSION_SECRET),
            response_mode: ResponseMode::Json,
            store_timeout: Duration::from_secs(5),
            sentry_dsn: None,
        };
        assert!(config.session_secret_is_default());

        config.session_secret = SecretString::from("y".repeat(40));
        assert!(!config.session_secret_is_default());
    }
}
