//! Cache configuration

use std::env;

use trove_core::{Result, StoreKind};
use trove_storage::{DatabaseConfig, RedisConfig};

/// Configuration consumed by the [`CacheManager`](crate::CacheManager)
///
/// Backend-specific sections are only consulted when the corresponding store
/// is actually constructed.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Backend used when no explicit store name is given
    pub default_store: StoreKind,

    /// Prefix prepended to every logical key before it reaches a backend
    pub prefix: String,

    /// Database store settings
    pub database: DatabaseConfig,

    /// Redis store settings
    pub redis: RedisConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_store: StoreKind::Database,
            prefix: "app_cache_".to_string(),
            database: DatabaseConfig::default(),
            redis: RedisConfig::default(),
        }
    }
}

impl CacheConfig {
    /// Create config with a specific default store
    pub fn with_store(kind: StoreKind) -> Self {
        Self {
            default_store: kind,
            ..Default::default()
        }
    }

    /// Set the key prefix
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the database store settings
    pub fn database(mut self, database: DatabaseConfig) -> Self {
        self.database = database;
        self
    }

    /// Set the Redis store settings
    pub fn redis(mut self, redis: RedisConfig) -> Self {
        self.redis = redis;
        self
    }

    /// Build configuration from the environment
    ///
    /// Reads `CACHE_STORE`, `CACHE_PREFIX`, `CACHE_DB_PATH`, `REDIS_HOST`,
    /// `REDIS_PORT`, `REDIS_USERNAME` and `REDIS_PASSWORD`, falling back to
    /// the defaults above. An unrecognized `CACHE_STORE` value is a
    /// configuration error.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(store) = env::var("CACHE_STORE") {
            config.default_store = store.parse()?;
        }
        if let Ok(prefix) = env::var("CACHE_PREFIX") {
            config.prefix = prefix;
        }
        if let Ok(path) = env::var("CACHE_DB_PATH") {
            config.database = DatabaseConfig::new(path);
        }
        if let Ok(host) = env::var("REDIS_HOST") {
            config.redis.host = host;
        }
        if let Some(port) = env::var("REDIS_PORT").ok().and_then(|p| p.parse().ok()) {
            config.redis.port = port;
        }
        if let Ok(username) = env::var("REDIS_USERNAME") {
            config.redis.username = Some(username);
        }
        if let Ok(password) = env::var("REDIS_PASSWORD") {
            config.redis.password = Some(password);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.default_store, StoreKind::Database);
        assert_eq!(config.prefix, "app_cache_");
    }

    #[test]
    fn test_builders() {
        let config = CacheConfig::with_store(StoreKind::InMemory).prefix("web_");
        assert_eq!(config.default_store, StoreKind::InMemory);
        assert_eq!(config.prefix, "web_");
    }

    #[test]
    fn test_from_env_rejects_unknown_store() {
        env::set_var("CACHE_STORE", "memcached");
        let err = CacheConfig::from_env().unwrap_err();
        env::remove_var("CACHE_STORE");

        assert_eq!(err.to_string(), "cache store [memcached] is not supported");
    }
}
