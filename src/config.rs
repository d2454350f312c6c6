//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;

/// Cache layer configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Connection URL for the external key-value store
    pub redis_url: String,
    /// Maximum number of pooled Redis connections
    pub pool_size: usize,
    /// Expiry window in seconds for cached page responses
    pub page_ttl: u64,
    /// Timeout in seconds for a single page fetch
    pub fetch_timeout: u64,
    /// Whether to wipe the store when the process starts
    pub flush_on_start: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `REDIS_URL` - Key-value store URL (default: redis://127.0.0.1:6379)
    /// - `REDIS_POOL_SIZE` - Pooled connections (default: 8)
    /// - `PAGE_CACHE_TTL` - Page cache expiry in seconds (default: 10)
    /// - `FETCH_TIMEOUT_SECS` - Page fetch timeout in seconds (default: 30)
    /// - `FLUSH_ON_START` - Wipe the store at startup, "true"/"false" (default: false)
    pub fn from_env() -> Self {
        Self {
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            pool_size: env::var("REDIS_POOL_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8),
            page_ttl: env::var("PAGE_CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            fetch_timeout: env::var("FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            flush_on_start: env::var("FLUSH_ON_START")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            pool_size: 8,
            page_ttl: 10,
            fetch_timeout: 30,
            flush_on_start: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.redis_url, "redis://127.0.0.1:6379");
        assert_eq!(config.pool_size, 8);
        assert_eq!(config.page_ttl, 10);
        assert_eq!(config.fetch_timeout, 30);
        assert!(!config.flush_on_start);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("REDIS_URL");
        env::remove_var("REDIS_POOL_SIZE");
        env::remove_var("PAGE_CACHE_TTL");
        env::remove_var("FETCH_TIMEOUT_SECS");
        env::remove_var("FLUSH_ON_START");

        let config = Config::from_env();
        assert_eq!(config.redis_url, "redis://127.0.0.1:6379");
        assert_eq!(config.pool_size, 8);
        assert_eq!(config.page_ttl, 10);
        assert_eq!(config.fetch_timeout, 30);
        assert!(!config.flush_on_start);
    }
}
