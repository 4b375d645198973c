//! Database-table cache store

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::warn;

use super::{CacheRow, DatabaseConfig, RowStore, SqliteRowStore};
use trove_core::{CacheStore, Result};

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Cache store persisting one row per key through a [`RowStore`]
///
/// Reads go through the row collaborator and apply lazy expiry: a row whose
/// `expires_at` has passed is deleted during the read and reported as
/// missing. All row-level faults are absorbed into negative results and
/// logged.
#[derive(Clone)]
pub struct DatabaseStore {
    rows: Arc<dyn RowStore>,
}

impl DatabaseStore {
    /// Create a store backed by SQLite at the configured path
    pub fn new(config: DatabaseConfig) -> Self {
        Self::with_row_store(Arc::new(SqliteRowStore::new(config.path)))
    }

    /// Create a store over a custom row collaborator
    pub fn with_row_store(rows: Arc<dyn RowStore>) -> Self {
        Self { rows }
    }

    async fn try_get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let Some(row) = self.rows.find(key).await? else {
            return Ok(None);
        };

        if matches!(row.expires_at, Some(at) if now_millis() > at) {
            self.rows.delete(key).await?;
            return Ok(None);
        }

        Ok(Some(row.value.into_bytes()))
    }

    async fn try_put(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        let value = String::from_utf8(value)
            .map_err(|e| trove_core::CacheError::Serialization(e.to_string()))?;
        let expires_at = ttl.map(|ttl| now_millis() + ttl.as_millis() as i64);
        self.rows
            .upsert(CacheRow {
                key: key.to_string(),
                value,
                expires_at,
            })
            .await
    }
}

#[async_trait]
impl CacheStore for DatabaseStore {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        match self.try_get(key).await {
            Ok(value) => value,
            Err(err) => {
                warn!(target: "trove", key, error = %err, "database get failed");
                None
            }
        }
    }

    async fn put(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> bool {
        match self.try_put(key, value, ttl).await {
            Ok(()) => true,
            Err(err) => {
                warn!(target: "trove", key, error = %err, "database put failed");
                false
            }
        }
    }

    async fn forget(&self, key: &str) -> bool {
        match self.rows.delete(key).await {
            Ok(deleted) => deleted,
            Err(err) => {
                warn!(target: "trove", key, error = %err, "database forget failed");
                false
            }
        }
    }

    async fn flush(&self) -> bool {
        match self.rows.delete_all().await {
            Ok(()) => true,
            Err(err) => {
                warn!(target: "trove", error = %err, "database flush failed");
                false
            }
        }
    }

    async fn many(&self, keys: &[String]) -> HashMap<String, Option<Vec<u8>>> {
        // Per-key reads so one bad row cannot poison the batch.
        let mut result = HashMap::with_capacity(keys.len());
        for key in keys {
            result.insert(key.clone(), self.get(key).await);
        }
        result
    }

    async fn put_many(&self, values: &[(String, Vec<u8>)], ttl: Option<Duration>) -> bool {
        let mut ok = true;
        for (key, value) in values {
            ok &= self.put(key, value.clone(), ttl).await;
        }
        ok
    }

    async fn increment(&self, key: &str, delta: i64) -> Option<i64> {
        // Read-modify-write; not atomic across concurrent callers.
        let current = match self.get(key).await {
            Some(bytes) => serde_json::from_slice::<i64>(&bytes).unwrap_or(0),
            None => 0,
        };
        let next = current + delta;
        if self.put(key, next.to_string().into_bytes(), None).await {
            Some(next)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trove_core::CacheError;

    /// Row collaborator that fails every call, for fault-absorption tests.
    struct FailingRowStore;

    #[async_trait]
    impl RowStore for FailingRowStore {
        async fn find(&self, _key: &str) -> Result<Option<CacheRow>> {
            Err(CacheError::Connection("database is down".to_string()))
        }

        async fn upsert(&self, _row: CacheRow) -> Result<()> {
            Err(CacheError::Connection("database is down".to_string()))
        }

        async fn delete(&self, _key: &str) -> Result<bool> {
            Err(CacheError::Connection("database is down".to_string()))
        }

        async fn delete_all(&self) -> Result<()> {
            Err(CacheError::Connection("database is down".to_string()))
        }
    }

    fn sqlite_store() -> DatabaseStore {
        DatabaseStore::new(DatabaseConfig::new(":memory:"))
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let store = sqlite_store();

        assert!(store.put("key1", b"\"value1\"".to_vec(), None).await);
        assert_eq!(store.get("key1").await, Some(b"\"value1\"".to_vec()));
    }

    #[tokio::test]
    async fn test_expired_row_is_deleted_on_read() {
        let rows = Arc::new(SqliteRowStore::new(":memory:"));
        let store = DatabaseStore::with_row_store(rows.clone());

        rows.upsert(CacheRow {
            key: "stale".to_string(),
            value: "\"old\"".to_string(),
            expires_at: Some(now_millis() - 1_000),
        })
        .await
        .unwrap();

        assert_eq!(store.get("stale").await, None);
        // The read removed the stale row.
        assert_eq!(rows.find("stale").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_future_expiry_still_readable() {
        let store = sqlite_store();
        store
            .put("key1", b"1".to_vec(), Some(Duration::from_secs(3600)))
            .await;
        assert_eq!(store.get("key1").await, Some(b"1".to_vec()));
    }

    #[tokio::test]
    async fn test_forget_idempotent() {
        let store = sqlite_store();
        store.put("key1", b"1".to_vec(), None).await;

        assert!(store.forget("key1").await);
        assert!(!store.forget("key1").await);
    }

    #[tokio::test]
    async fn test_flush() {
        let store = sqlite_store();
        store.put("key1", b"1".to_vec(), None).await;
        store.put("key2", b"2".to_vec(), None).await;

        assert!(store.flush().await);
        assert_eq!(store.get("key1").await, None);
        assert_eq!(store.get("key2").await, None);
    }

    #[tokio::test]
    async fn test_increment_arithmetic() {
        let store = sqlite_store();

        assert_eq!(store.increment("counter", 1).await, Some(1));
        assert_eq!(store.increment("counter", 5).await, Some(6));
        assert_eq!(store.decrement("counter", 2).await, Some(4));
    }

    #[tokio::test]
    async fn test_faults_become_negative_results() {
        let store = DatabaseStore::with_row_store(Arc::new(FailingRowStore));

        assert_eq!(store.get("key1").await, None);
        assert!(!store.put("key1", b"1".to_vec(), None).await);
        assert!(!store.forget("key1").await);
        assert!(!store.flush().await);
        assert_eq!(store.increment("counter", 1).await, None);

        let keys = vec!["x".to_string(), "y".to_string()];
        let result = store.many(&keys).await;
        assert_eq!(result["x"], None);
        assert_eq!(result["y"], None);
    }
}
