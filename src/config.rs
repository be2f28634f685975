//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;

use chrono::TimeDelta;
use tracing::warn;

use crate::cache::HashCacheOptions;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Redis connection URL, None = in-memory store
    pub redis_url: Option<String>,
    /// Maximum number of pooled Redis connections
    pub redis_pool_size: usize,
    /// HTTP server port
    pub server_port: u16,
    /// Namespace prepended to every group key
    pub namespace: Option<String>,
    /// Default lifetime in seconds for written fields
    pub default_expires_in: Option<i64>,
    /// Default race-condition window in seconds
    pub race_condition_ttl: Option<i64>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `REDIS_URL` - Redis URL (default: unset, uses the in-memory store)
    /// - `REDIS_POOL_SIZE` - Connection pool size (default: 16)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_NAMESPACE` - Group key namespace (default: unset)
    /// - `DEFAULT_EXPIRES_IN` - Field lifetime in seconds (default: unset, no expiry)
    /// - `RACE_CONDITION_TTL` - Race-condition window in seconds (default: unset)
    pub fn from_env() -> Self {
        Self {
            redis_url: non_empty_var("REDIS_URL"),
            redis_pool_size: parsed_var("REDIS_POOL_SIZE").unwrap_or(16),
            server_port: parsed_var("SERVER_PORT").unwrap_or(3000),
            namespace: non_empty_var("CACHE_NAMESPACE"),
            default_expires_in: parsed_var("DEFAULT_EXPIRES_IN"),
            race_condition_ttl: parsed_var("RACE_CONDITION_TTL"),
        }
    }

    /// Cache-wide options derived from this configuration.
    ///
    /// Durations too large to represent are ignored with a warning.
    pub fn cache_defaults(&self) -> HashCacheOptions {
        HashCacheOptions {
            namespace: self.namespace.clone(),
            expires_in: seconds_setting("DEFAULT_EXPIRES_IN", self.default_expires_in),
            race_condition_ttl: seconds_setting("RACE_CONDITION_TTL", self.race_condition_ttl),
            ..HashCacheOptions::default()
        }
    }
}

fn seconds_setting(name: &str, secs: Option<i64>) -> Option<TimeDelta> {
    let secs = secs?;
    let delta = TimeDelta::try_seconds(secs);
    if delta.is_none() {
        warn!("{} of {}s is out of range, ignoring", name, secs);
    }
    delta
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: None,
            redis_pool_size: 16,
            server_port: 3000,
            namespace: None,
            default_expires_in: None,
            race_condition_ttl: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.redis_url.is_none());
        assert_eq!(config.redis_pool_size, 16);
        assert_eq!(config.server_port, 3000);
        assert!(config.namespace.is_none());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("REDIS_URL");
        env::remove_var("REDIS_POOL_SIZE");
        env::remove_var("SERVER_PORT");
        env::remove_var("CACHE_NAMESPACE");
        env::remove_var("DEFAULT_EXPIRES_IN");
        env::remove_var("RACE_CONDITION_TTL");

        let config = Config::from_env();
        assert!(config.redis_url.is_none());
        assert_eq!(config.redis_pool_size, 16);
        assert_eq!(config.server_port, 3000);
        assert!(config.default_expires_in.is_none());
    }

    #[test]
    fn test_cache_defaults() {
        let config = Config {
            namespace: Some("app".to_string()),
            default_expires_in: Some(300),
            race_condition_ttl: Some(10),
            ..Config::default()
        };

        let defaults = config.cache_defaults();
        assert_eq!(defaults.namespace.as_deref(), Some("app"));
        assert_eq!(defaults.expires_in, Some(TimeDelta::seconds(300)));
        assert_eq!(defaults.race_condition_ttl, Some(TimeDelta::seconds(10)));
        assert!(defaults.version.is_none());
    }

    #[test]
    fn test_cache_defaults_ignore_out_of_range_durations() {
        let config = Config {
            default_expires_in: Some(i64::MAX),
            race_condition_ttl: Some(i64::MIN),
            ..Config::default()
        };

        let defaults = config.cache_defaults();
        assert!(defaults.expires_in.is_none());
        assert!(defaults.race_condition_ttl.is_none());
    }
}
