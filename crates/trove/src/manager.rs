//! High-level cache manager

use dashmap::DashMap;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use trove_core::{CacheStore, JsonSerializer, Result, Serializer, StoreKind};
use trove_storage::{DatabaseStore, MemoryStore, RedisStore};

use crate::CacheConfig;

/// High-level cache manager
///
/// Owns a registry of lazily constructed store backends, applies the
/// configured key prefix to every operation, and layers composite operations
/// (`remember`, `pull`, `add`, bulk get/put) on the raw store contract.
///
/// Apart from [`store`](CacheManager::store) with an unknown name, no
/// operation fails: backend faults surface as the operation's negative
/// result, so callers treat every outcome as "value not available, proceed
/// without cache".
///
/// Cloning creates a new handle to the SAME registry, so one manager per
/// process is one set of backend instances.
pub struct CacheManager<S: Serializer = JsonSerializer> {
    stores: Arc<DashMap<StoreKind, Arc<dyn CacheStore>>>,
    serializer: S,
    config: CacheConfig,
}

impl CacheManager<JsonSerializer> {
    /// Create a manager with the default JSON serializer
    pub fn new(config: CacheConfig) -> Self {
        Self::with_serializer(config, JsonSerializer)
    }
}

impl<S: Serializer> CacheManager<S> {
    /// Create a manager with a custom serializer
    pub fn with_serializer(config: CacheConfig, serializer: S) -> Self {
        Self {
            stores: Arc::new(DashMap::new()),
            serializer,
            config,
        }
    }

    /// The active configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn prefix_key(&self, key: &str) -> String {
        format!("{}{}", self.config.prefix, key)
    }

    fn build_store(&self, kind: StoreKind) -> Arc<dyn CacheStore> {
        match kind {
            StoreKind::InMemory => Arc::new(MemoryStore::new()),
            StoreKind::Database => Arc::new(DatabaseStore::new(self.config.database.clone())),
            StoreKind::Redis => Arc::new(RedisStore::new(self.config.redis.clone())),
        }
    }

    fn store_for(&self, kind: StoreKind) -> Arc<dyn CacheStore> {
        // The entry guard makes first-use construction once-only even under
        // concurrent callers; instances live as long as the manager.
        self.stores
            .entry(kind)
            .or_insert_with(|| self.build_store(kind))
            .clone()
    }

    fn default_store(&self) -> Arc<dyn CacheStore> {
        self.store_for(self.config.default_store)
    }

    /// Resolve a store by name, defaulting to the configured store
    ///
    /// The backend is constructed on first request for its name and reused
    /// afterwards. An unknown name is a configuration mistake and the one
    /// error this type surfaces.
    pub fn store(&self, name: Option<&str>) -> Result<Arc<dyn CacheStore>> {
        let kind = match name {
            Some(name) => name.parse()?,
            None => self.config.default_store,
        };
        Ok(self.store_for(kind))
    }

    /// Get a value by logical key
    ///
    /// A missing key, an expired entry, a backend fault, and a malformed
    /// payload all come back as `None`.
    pub async fn get<T>(&self, key: &str) -> Option<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let bytes = self.default_store().get(&self.prefix_key(key)).await?;
        match self.serializer.deserialize(&bytes) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(target: "trove", key, error = %err, "discarding malformed cache payload");
                None
            }
        }
    }

    /// Store a value, replacing any existing entry
    ///
    /// `ttl` of `None` stores the entry forever.
    pub async fn put<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> bool
    where
        T: serde::Serialize,
    {
        let bytes = match self.serializer.serialize(value) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(target: "trove", key, error = %err, "cache put skipped");
                return false;
            }
        };
        self.default_store()
            .put(&self.prefix_key(key), bytes, ttl)
            .await
    }

    /// Remove the entry for a key
    pub async fn forget(&self, key: &str) -> bool {
        self.default_store().forget(&self.prefix_key(key)).await
    }

    /// Remove every entry in the default store
    ///
    /// Backend-wide: entries outside this manager's prefix go too.
    pub async fn flush(&self) -> bool {
        self.default_store().flush().await
    }

    /// True iff `get` would currently return a value
    pub async fn has(&self, key: &str) -> bool {
        self.default_store().has(&self.prefix_key(key)).await
    }

    /// True iff `get` would currently return `None`
    pub async fn missing(&self, key: &str) -> bool {
        !self.has(key).await
    }

    /// Get several keys at once
    ///
    /// Result keys are the logical (unprefixed) names.
    pub async fn many<T>(&self, keys: &[&str]) -> HashMap<String, Option<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let prefixed: Vec<String> = keys.iter().map(|k| self.prefix_key(k)).collect();
        let mut raw = self.default_store().many(&prefixed).await;

        keys.iter()
            .zip(prefixed)
            .map(|(key, prefixed_key)| {
                let value = raw
                    .remove(&prefixed_key)
                    .flatten()
                    .and_then(|bytes| self.serializer.deserialize(&bytes).ok());
                (key.to_string(), value)
            })
            .collect()
    }

    /// Store several entries with one ttl policy
    pub async fn put_many<T>(&self, values: &[(&str, T)], ttl: Option<Duration>) -> bool
    where
        T: serde::Serialize,
    {
        let mut entries = Vec::with_capacity(values.len());
        for (key, value) in values {
            match self.serializer.serialize(value) {
                Ok(bytes) => entries.push((self.prefix_key(key), bytes)),
                Err(err) => {
                    warn!(target: "trove", key, error = %err, "cache put_many skipped");
                    return false;
                }
            }
        }
        self.default_store().put_many(&entries, ttl).await
    }

    /// Adjust a numeric entry by `delta`, treating an absent key as 0
    pub async fn increment(&self, key: &str, delta: i64) -> Option<i64> {
        self.default_store()
            .increment(&self.prefix_key(key), delta)
            .await
    }

    /// Adjust a numeric entry by `-delta`
    pub async fn decrement(&self, key: &str, delta: i64) -> Option<i64> {
        self.default_store()
            .decrement(&self.prefix_key(key), delta)
            .await
    }

    /// Return the cached value, or compute and store it with the given ttl
    ///
    /// `compute` is not invoked on a hit. Not atomic: concurrent callers
    /// missing on the same key may each compute, last write wins.
    pub async fn remember<T, F, Fut>(&self, key: &str, ttl: Duration, compute: F) -> T
    where
        T: serde::Serialize + serde::de::DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if let Some(cached) = self.get(key).await {
            return cached;
        }

        let value = compute().await;
        self.put(key, &value, Some(ttl)).await;
        value
    }

    /// Return the cached value, or compute and store it forever
    pub async fn remember_forever<T, F, Fut>(&self, key: &str, compute: F) -> T
    where
        T: serde::Serialize + serde::de::DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if let Some(cached) = self.get(key).await {
            return cached;
        }

        let value = compute().await;
        self.put(key, &value, None).await;
        value
    }

    /// Read a value and delete it in one call
    ///
    /// Read and delete are sequential, not atomic: a write landing between
    /// the two is lost.
    pub async fn pull<T>(&self, key: &str) -> Option<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let value = self.get(key).await;
        self.forget(key).await;
        value
    }

    /// Store a value only if the key is not already present
    ///
    /// Returns `false` without modifying anything when the key exists.
    /// Check and set are not atomic against concurrent `add` on the same
    /// key.
    pub async fn add<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> bool
    where
        T: serde::Serialize,
    {
        if self.has(key).await {
            return false;
        }
        self.put(key, value, ttl).await
    }

    /// Store a value with no expiry
    pub async fn forever<T>(&self, key: &str, value: &T) -> bool
    where
        T: serde::Serialize,
    {
        self.put(key, value, None).await
    }
}

impl<S: Serializer> Clone for CacheManager<S> {
    fn clone(&self) -> Self {
        Self {
            stores: self.stores.clone(),
            serializer: self.serializer.clone(),
            config: self.config.clone(),
        }
    }
}
