//! In-memory cache store using DashMap

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use trove_core::CacheStore;

/// One stored entry; expiry is an absolute instant so reads can compare
/// without rederiving elapsed time.
#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        matches!(self.expires_at, Some(at) if Instant::now() >= at)
    }
}

/// In-memory cache store
///
/// A single concurrent map held entirely in process memory; nothing survives
/// a restart. Expired entries are removed lazily when a read touches them.
/// Cloning creates a new handle to the SAME underlying map.
///
/// Uses `tokio::time::Instant` for expiry so tests can drive the clock with
/// `tokio::time::pause`/`advance` instead of sleeping.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, Entry>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held, expired or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => return Some(entry.value.clone()),
            Some(_) => {}
            None => return None,
        }
        // Lazy expiry: the read guard is released before the removal.
        self.entries.remove(key);
        None
    }

    async fn put(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> bool {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        self.entries
            .insert(key.to_string(), Entry { value, expires_at });
        true
    }

    async fn forget(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    async fn flush(&self) -> bool {
        self.entries.clear();
        true
    }

    async fn many(&self, keys: &[String]) -> HashMap<String, Option<Vec<u8>>> {
        let mut result = HashMap::with_capacity(keys.len());
        for key in keys {
            result.insert(key.clone(), self.get(key).await);
        }
        result
    }

    async fn put_many(&self, values: &[(String, Vec<u8>)], ttl: Option<Duration>) -> bool {
        for (key, value) in values {
            self.put(key, value.clone(), ttl).await;
        }
        true
    }

    async fn increment(&self, key: &str, delta: i64) -> Option<i64> {
        // The entry guard serializes concurrent counter updates on one key.
        let mut entry = self.entries.entry(key.to_string()).or_insert(Entry {
            value: b"0".to_vec(),
            expires_at: None,
        });
        let current = if entry.is_expired() {
            0
        } else {
            serde_json::from_slice::<i64>(&entry.value).unwrap_or(0)
        };
        let next = current + delta;
        // Counters are stored without expiry, matching put-with-no-ttl.
        entry.value = next.to_string().into_bytes();
        entry.expires_at = None;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_basic_put_get() {
        let store = MemoryStore::new();

        assert!(store.put("key1", b"value1".to_vec(), None).await);
        assert_eq!(store.get("key1").await, Some(b"value1".to_vec()));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nonexistent").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiry_removes_entry() {
        let store = MemoryStore::new();
        store
            .put("key1", b"value1".to_vec(), Some(Duration::from_secs(60)))
            .await;

        assert_eq!(store.get("key1").await, Some(b"value1".to_vec()));

        tokio::time::advance(Duration::from_secs(61)).await;

        assert_eq!(store.get("key1").await, None);
        assert!(!store.has("key1").await);
        // The expired entry was removed by the read itself.
        assert_eq!(store.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_forever_entry_survives() {
        let store = MemoryStore::new();
        store.put("key1", b"value1".to_vec(), None).await;

        tokio::time::advance(Duration::from_secs(86_400 * 365)).await;

        assert_eq!(store.get("key1").await, Some(b"value1".to_vec()));
    }

    #[tokio::test]
    async fn test_forget_is_idempotent() {
        let store = MemoryStore::new();
        store.put("key1", b"value1".to_vec(), None).await;

        assert!(store.forget("key1").await);
        assert!(!store.forget("key1").await);
        assert_eq!(store.get("key1").await, None);
    }

    #[tokio::test]
    async fn test_flush() {
        let store = MemoryStore::new();
        store.put("key1", b"value1".to_vec(), None).await;
        store.put("key2", b"value2".to_vec(), None).await;

        assert!(store.flush().await);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_many_partial() {
        let store = MemoryStore::new();
        store.put("key1", b"value1".to_vec(), None).await;

        let keys = vec!["key1".to_string(), "key2".to_string()];
        let result = store.many(&keys).await;

        assert_eq!(result["key1"], Some(b"value1".to_vec()));
        assert_eq!(result["key2"], None);
    }

    #[tokio::test]
    async fn test_increment_decrement() {
        let store = MemoryStore::new();

        assert_eq!(store.increment("counter", 1).await, Some(1));
        assert_eq!(store.increment("counter", 5).await, Some(6));
        assert_eq!(store.decrement("counter", 2).await, Some(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_increment_restarts_after_expiry() {
        let store = MemoryStore::new();
        store
            .put("counter", b"9".to_vec(), Some(Duration::from_secs(1)))
            .await;

        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(store.increment("counter", 1).await, Some(1));
    }

    #[tokio::test]
    async fn test_increment_over_non_numeric_value() {
        let store = MemoryStore::new();
        store.put("key1", b"\"text\"".to_vec(), None).await;

        assert_eq!(store.increment("key1", 3).await, Some(3));
    }
}
