//! Redis cache store

use async_trait::async_trait;
use bb8::{Pool, PooledConnection};
use bb8_redis::RedisConnectionManager;
use redis::{AsyncCommands, Value};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::warn;

use super::RedisConfig;
use trove_core::{CacheError, CacheStore, Result};

/// Cache store backed by a remote Redis server
///
/// The connection pool is built on first use and reused afterwards; the
/// `OnceCell` guarantees a single pool even when the first uses race.
/// Values arrive already serialized to JSON text, so they are sent to the
/// server verbatim and TTLs are delegated to the server's native expiry.
pub struct RedisStore {
    config: RedisConfig,
    pool: OnceCell<Pool<RedisConnectionManager>>,
}

impl RedisStore {
    /// Create a store for the configured server without connecting
    pub fn new(config: RedisConfig) -> Self {
        Self {
            config,
            pool: OnceCell::new(),
        }
    }

    async fn pool(&self) -> Result<&Pool<RedisConnectionManager>> {
        self.pool
            .get_or_try_init(|| async {
                let manager = RedisConnectionManager::new(self.config.url().as_str())
                    .map_err(|e| CacheError::Connection(e.to_string()))?;
                Pool::builder()
                    .max_size(self.config.pool_size)
                    .connection_timeout(self.config.connection_timeout)
                    .build(manager)
                    .await
                    .map_err(|e| CacheError::Connection(e.to_string()))
            })
            .await
    }

    async fn connection(&self) -> Result<PooledConnection<'_, RedisConnectionManager>> {
        self.pool()
            .await?
            .get()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))
    }

    async fn try_get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.connection().await?;
        conn.get(key)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn try_put(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.connection().await?;
        match ttl {
            Some(ttl) => conn
                .set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1))
                .await
                .map_err(|e| CacheError::Backend(e.to_string())),
            None => conn
                .set::<_, _, ()>(key, value)
                .await
                .map_err(|e| CacheError::Backend(e.to_string())),
        }
    }

    async fn try_forget(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let deleted: u64 = conn
            .del(key)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(deleted > 0)
    }

    async fn try_flush(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        redis::cmd("FLUSHDB")
            .query_async::<()>(&mut *conn)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn try_has(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        conn.exists(key)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn try_many(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>> {
        let mut conn = self.connection().await?;
        conn.mget(keys)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn try_put_many(
        &self,
        values: &[(String, Vec<u8>)],
        ttl: Option<Duration>,
    ) -> Result<()> {
        let mut conn = self.connection().await?;
        let mut pipe = redis::pipe();
        pipe.atomic();

        for (key, value) in values {
            match ttl {
                Some(ttl) => {
                    pipe.set_ex(key, value, ttl.as_secs().max(1));
                }
                None => {
                    pipe.set(key, value);
                }
            }
        }

        pipe.query_async::<Vec<Value>>(&mut *conn)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn try_increment(&self, key: &str, delta: i64) -> Result<i64> {
        let mut conn = self.connection().await?;
        // INCRBY is atomic on the server, unlike the other backends'
        // read-modify-write counters.
        conn.incr(key, delta)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        match self.try_get(key).await {
            Ok(value) => value,
            Err(err) => {
                warn!(target: "trove", key, error = %err, "redis get failed");
                None
            }
        }
    }

    async fn put(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> bool {
        match self.try_put(key, value, ttl).await {
            Ok(()) => true,
            Err(err) => {
                warn!(target: "trove", key, error = %err, "redis put failed");
                false
            }
        }
    }

    async fn forget(&self, key: &str) -> bool {
        match self.try_forget(key).await {
            Ok(deleted) => deleted,
            Err(err) => {
                warn!(target: "trove", key, error = %err, "redis forget failed");
                false
            }
        }
    }

    async fn flush(&self) -> bool {
        match self.try_flush().await {
            Ok(()) => true,
            Err(err) => {
                warn!(target: "trove", error = %err, "redis flush failed");
                false
            }
        }
    }

    async fn has(&self, key: &str) -> bool {
        match self.try_has(key).await {
            Ok(exists) => exists,
            Err(err) => {
                warn!(target: "trove", key, error = %err, "redis exists failed");
                false
            }
        }
    }

    /// Batch read via MGET
    ///
    /// Weaker guarantee than the logical contract: if the batch call itself
    /// fails, every requested key is reported as missing rather than
    /// retrying per key.
    async fn many(&self, keys: &[String]) -> HashMap<String, Option<Vec<u8>>> {
        if keys.is_empty() {
            return HashMap::new();
        }
        match self.try_many(keys).await {
            Ok(values) => keys.iter().cloned().zip(values).collect(),
            Err(err) => {
                warn!(target: "trove", error = %err, "redis mget failed");
                keys.iter().map(|k| (k.clone(), None)).collect()
            }
        }
    }

    async fn put_many(&self, values: &[(String, Vec<u8>)], ttl: Option<Duration>) -> bool {
        if values.is_empty() {
            return true;
        }
        match self.try_put_many(values, ttl).await {
            Ok(()) => true,
            Err(err) => {
                warn!(target: "trove", error = %err, "redis pipeline put failed");
                false
            }
        }
    }

    async fn increment(&self, key: &str, delta: i64) -> Option<i64> {
        match self.try_increment(key, delta).await {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(target: "trove", key, error = %err, "redis increment failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A store pointed at a port nothing listens on, so every connection
    /// attempt fails fast.
    fn unreachable_store() -> RedisStore {
        let mut config = RedisConfig::new("127.0.0.1", 1);
        config.connection_timeout = Duration::from_millis(200);
        RedisStore::new(config)
    }

    #[tokio::test]
    async fn test_many_reports_all_keys_missing_when_batch_fails() {
        let store = unreachable_store();

        let keys = vec!["x".to_string(), "y".to_string()];
        let result = store.many(&keys).await;

        assert_eq!(result.len(), 2);
        assert_eq!(result["x"], None);
        assert_eq!(result["y"], None);
    }

    #[tokio::test]
    async fn test_faults_become_negative_results() {
        let store = unreachable_store();

        assert_eq!(store.get("key1").await, None);
        assert!(!store.put("key1", b"1".to_vec(), None).await);
        assert!(!store.forget("key1").await);
        assert!(!store.flush().await);
        assert!(!store.has("key1").await);
        assert_eq!(store.increment("counter", 1).await, None);
    }

    #[tokio::test]
    async fn test_many_with_no_keys_skips_the_server() {
        let store = unreachable_store();
        assert!(store.many(&[]).await.is_empty());
        assert!(store.put_many(&[], None).await);
    }
}
