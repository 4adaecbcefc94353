//! Front desk configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `REPAIRDESK_HOST` - Bind address (default: 127.0.0.1)
//! - `REPAIRDESK_PORT` - Listen port (default: 3000)
//! - `REPAIRDESK_BASE_URL` - Public URL of the front desk (default: <http://localhost:3000>)
//! - `REPAIRDESK_BACKEND_URL` - Ticket backend base URL (default: <http://localhost:8082>)
//! - `REPAIRDESK_BACKEND_TIMEOUT_SECS` - Per-request backend timeout (default: 10)
//! - `REPAIRDESK_TICKET_SELECTION` - Featured ticket policy, `first` or `latest` (default: first)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use repairdesk_core::TicketSelection;
use thiserror::Error;
use url::Url;

const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Front desk application configuration.
#[derive(Debug, Clone)]
pub struct FrontdeskConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the front desk
    pub base_url: String,
    /// Ticket backend connection settings
    pub backend: BackendConfig,
    /// Which ticket the client dashboard features by default
    pub ticket_selection: TicketSelection,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced to Sentry
    pub sentry_traces_sample_rate: f32,
}

/// Ticket backend connection settings.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL every backend path is resolved against
    pub url: Url,
    /// Timeout applied to every backend request
    pub timeout: Duration,
}

impl FrontdeskConfig {
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

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(lookup);

        let host = env.parsed("REPAIRDESK_HOST", "127.0.0.1")?;
        let port = env.parsed("REPAIRDESK_PORT", "3000")?;
        let base_url = env.or_default("REPAIRDESK_BASE_URL", "http://localhost:3000");
        let backend = BackendConfig::from_lookup(&env)?;
        let ticket_selection = env.parsed("REPAIRDESK_TICKET_SELECTION", "first")?;

        let sentry_dsn = env.optional("SENTRY_DSN");
        let sentry_environment = env.optional("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env.parsed("SENTRY_SAMPLE_RATE", "1.0")?;
        let sentry_traces_sample_rate = env.parsed("SENTRY_TRACES_SAMPLE_RATE", "0.0")?;

        Ok(Self {
            host,
            port,
            base_url,
            backend,
            ticket_selection,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the front desk is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl BackendConfig {
    /// Settings pointing at `url` with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `url` cannot be parsed.
    pub fn new(url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            url: parse_base_url("REPAIRDESK_BACKEND_URL", url)?,
            timeout: Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS),
        })
    }

    fn from_lookup<F>(env: &Lookup<F>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = env.or_default("REPAIRDESK_BACKEND_URL", "http://localhost:8082");
        let url = parse_base_url("REPAIRDESK_BACKEND_URL", &raw_url)?;

        let secs: u64 = env.parsed(
            "REPAIRDESK_BACKEND_TIMEOUT_SECS",
            &DEFAULT_BACKEND_TIMEOUT_SECS.to_string(),
        )?;
        if secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "REPAIRDESK_BACKEND_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            url,
            timeout: Duration::from_secs(secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Lookup<F>(F);

impl<F> Lookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get a variable with a default value and parse it.
    fn parsed<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

/// Parse a base URL, making sure joined paths land under it.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<FrontdeskConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        FrontdeskConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.backend.url.as_str(), "http://localhost:8082/");
        assert_eq!(config.backend.timeout, Duration::from_secs(10));
        assert_eq!(config.ticket_selection, TicketSelection::First);
        assert!(config.sentry_dsn.is_none());
        assert!((config.sentry_sample_rate - 1.0).abs() < f32::EPSILON);
        assert!(config.sentry_traces_sample_rate.abs() < f32::EPSILON);
        assert!(!config.is_secure());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("REPAIRDESK_HOST", "0.0.0.0"),
            ("REPAIRDESK_PORT", "8080"),
            ("REPAIRDESK_BASE_URL", "https://taller.example.com"),
            ("REPAIRDESK_BACKEND_URL", "http://api.internal:9000/v1"),
            ("REPAIRDESK_BACKEND_TIMEOUT_SECS", "3"),
            ("REPAIRDESK_TICKET_SELECTION", "latest"),
            ("SENTRY_DSN", "https://key@sentry.example.com/1"),
        ])
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert!(config.is_secure());
        assert_eq!(config.backend.url.as_str(), "http://api.internal:9000/v1/");
        assert_eq!(config.backend.timeout, Duration::from_secs(3));
        assert_eq!(config.ticket_selection, TicketSelection::Latest);
        assert!(config.sentry_dsn.is_some());
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = load(&[("REPAIRDESK_PORT", "  "), ("SENTRY_DSN", "")]).unwrap();
        assert_eq!(config.port, 3000);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("REPAIRDESK_HOST", "not-an-ip"),
            ("REPAIRDESK_PORT", "99999"),
            ("REPAIRDESK_BACKEND_URL", "localhost"),
            ("REPAIRDESK_BACKEND_TIMEOUT_SECS", "0"),
            ("REPAIRDESK_BACKEND_TIMEOUT_SECS", "soon"),
            ("REPAIRDESK_TICKET_SELECTION", "random"),
            ("SENTRY_SAMPLE_RATE", "all"),
        ] {
            let err = load(&[(key, value)]).unwrap_err();
            assert!(
                matches!(&err, ConfigError::InvalidEnvVar(k, _) if k == key),
                "{key}={value} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_backend_config_new() {
        let backend = BackendConfig::new("http://127.0.0.1:4000").unwrap();
        assert_eq!(backend.url.as_str(), "http://127.0.0.1:4000/");
        assert!(BackendConfig::new("::nope::").is_err());
    }
}
