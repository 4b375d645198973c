//! Cache store trait

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Core trait for all cache storage backends
///
/// Every operation receives an already-prefixed key and treats the value as
/// an opaque serialized payload; serialization format is decided by the
/// manager, storage representation by the backend.
///
/// Failure semantics: backends never propagate errors through this trait.
/// Any lower-level fault (connection loss, SQL error, malformed payload) is
/// absorbed and surfaced as the operation's negative result, so a cache miss
/// and a cache fault are indistinguishable to the caller by design.
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Get the stored payload for a key
    ///
    /// Returns `None` if the key is absent, expired, or the lookup failed.
    /// An expired entry is removed as a side effect of the read.
    async fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store a payload, replacing any existing entry
    ///
    /// `ttl` of `None` stores the entry forever. Returns `false` when the
    /// write could not be performed.
    async fn put(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> bool;

    /// Remove the entry for a key
    ///
    /// Idempotent: removing an absent key is not an error.
    async fn forget(&self, key: &str) -> bool;

    /// Remove every entry in the backend
    ///
    /// Flush is backend-wide; key prefixes are a manager concern and are not
    /// honored here.
    async fn flush(&self) -> bool;

    /// True iff `get` would currently return a value
    async fn has(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }

    /// Get several keys at once
    ///
    /// The result maps every requested key to its payload or `None`,
    /// independently per key where the backend allows it.
    async fn many(&self, keys: &[String]) -> HashMap<String, Option<Vec<u8>>>;

    /// Store several entries with one ttl policy
    async fn put_many(&self, values: &[(String, Vec<u8>)], ttl: Option<Duration>) -> bool;

    /// Adjust a numeric entry by `delta`, treating an absent key as 0
    ///
    /// Returns the new value, or `None` if the adjustment failed.
    async fn increment(&self, key: &str, delta: i64) -> Option<i64>;

    /// Adjust a numeric entry by `-delta`
    async fn decrement(&self, key: &str, delta: i64) -> Option<i64> {
        self.increment(key, -delta).await
    }
}

impl std::fmt::Debug for dyn CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn CacheStore")
    }
}
