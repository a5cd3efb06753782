//! Configuration module for loading settings from environment variables.

use std::time::Duration;
use thiserror::Error;

/// Timeout applied to every upstream quote request.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed.
    #[error("invalid value for {name}: {value}")]
    InvalidValue {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },
    /// A validated constraint was violated.
    #[error("invalid config value: {0}")]
    Constraint(String),
}

/// Root configuration structure.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host address to bind to.
    pub host: String,
    /// Port number to listen on.
    pub port: u16,
    /// Database connection string.
    pub database_url: String,
    /// Quote cache time-to-live in seconds.
    pub quote_cache_ttl_secs: u64,
    /// User cache time-to-live in seconds.
    pub user_cache_ttl_secs: u64,
    /// Maximum entry count per cache.
    pub cache_capacity: usize,
    /// API key for the upstream quote service.
    pub upstream_token: String,
    /// Base URL of the upstream quote service.
    pub upstream_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "sqlite:users.db".to_string(),
            quote_cache_ttl_secs: 1200,
            user_cache_ttl_secs: 300,
            cache_capacity: 1000,
            upstream_token: "your_token_here".to_string(),
            upstream_url: "https://brapi.dev/api/quote".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from process environment variables, falling
    /// back to defaults for anything unset.
    ///
    /// # Errors
    /// Returns error if a set variable cannot be parsed or a constraint
    /// is violated.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns error if a value cannot be parsed or a constraint is
    /// violated.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "PORT", defaults.port)?,
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            quote_cache_ttl_secs: parse_var(&lookup, "CACHE_TTL", defaults.quote_cache_ttl_secs)?,
            user_cache_ttl_secs: parse_var(
                &lookup,
                "USER_CACHE_TTL",
                defaults.user_cache_ttl_secs,
            )?,
            cache_capacity: parse_var(&lookup, "CACHE_CAPACITY", defaults.cache_capacity)?,
            upstream_token: lookup("BRAPI_TOKEN").unwrap_or(defaults.upstream_token),
            upstream_url: lookup("BRAPI_URL").unwrap_or(defaults.upstream_url),
        };

        config.validate()?;
        Ok(config)
    }

    /// Quote cache TTL as a [`Duration`].
    #[must_use]
    pub fn quote_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.quote_cache_ttl_secs)
    }

    /// User cache TTL as a [`Duration`].
    #[must_use]
    pub fn user_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.user_cache_ttl_secs)
    }

    /// Validates the configuration values.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.quote_cache_ttl_secs == 0 {
            return Err(ConfigError::Constraint(
                "CACHE_TTL must be positive".to_string(),
            ));
        }
        if self.user_cache_ttl_secs == 0 {
            return Err(ConfigError::Constraint(
                "USER_CACHE_TTL must be positive".to_string(),
            ));
        }
        if self.cache_capacity == 0 {
            return Err(ConfigError::Constraint(
                "CACHE_CAPACITY must be positive".to_string(),
            ));
        }
        if self.upstream_url.is_empty() {
            return Err(ConfigError::Constraint(
                "BRAPI_URL cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parses an optional environment value, keeping the default when unset.
fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
        None => Ok(default),
    }
}
