//! SQLite-backed row store

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use tokio::sync::OnceCell;

use super::{CacheRow, RowStore};
use trove_core::{CacheError, Result};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS cache_entries (
    key        TEXT PRIMARY KEY,
    value      TEXT NOT NULL,
    expires_at INTEGER
);";

/// SQLite implementation of [`RowStore`]
///
/// The connection is opened on first use and reused for the lifetime of the
/// store; the `OnceCell` guarantees a single connection even when the first
/// uses race.
///
/// Statements run synchronously on the calling executor thread. Every query
/// here is a single-row lookup or write on a primary key, so they complete
/// in microseconds; workloads where that assumption breaks should wrap this
/// store in `tokio::task::spawn_blocking`.
pub struct SqliteRowStore {
    path: PathBuf,
    conn: OnceCell<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteRowStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteRowStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteRowStore {
    /// Create a store for the database at `path` without opening it
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            conn: OnceCell::new(),
        }
    }

    async fn conn(&self) -> Result<&Mutex<Connection>> {
        self.conn
            .get_or_try_init(|| async {
                let conn = Connection::open(&self.path)
                    .map_err(|e| CacheError::Connection(e.to_string()))?;
                conn.execute_batch(
                    "PRAGMA journal_mode=WAL;
                     PRAGMA synchronous=NORMAL;",
                )
                .map_err(|e| CacheError::Connection(e.to_string()))?;
                conn.execute_batch(SCHEMA)
                    .map_err(|e| CacheError::Connection(e.to_string()))?;
                Ok(Mutex::new(conn))
            })
            .await
    }
}

#[async_trait]
impl RowStore for SqliteRowStore {
    async fn find(&self, key: &str) -> Result<Option<CacheRow>> {
        let conn = self.conn().await?;
        let guard = conn.lock();
        guard
            .query_row(
                "SELECT key, value, expires_at FROM cache_entries WHERE key = ?1",
                params![key],
                |row| {
                    Ok(CacheRow {
                        key: row.get(0)?,
                        value: row.get(1)?,
                        expires_at: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn upsert(&self, row: CacheRow) -> Result<()> {
        let conn = self.conn().await?;
        let guard = conn.lock();
        guard
            .execute(
                "INSERT OR REPLACE INTO cache_entries (key, value, expires_at)
                 VALUES (?1, ?2, ?3)",
                params![row.key, row.value, row.expires_at],
            )
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let conn = self.conn().await?;
        let guard = conn.lock();
        let affected = guard
            .execute("DELETE FROM cache_entries WHERE key = ?1", params![key])
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(affected > 0)
    }

    async fn delete_all(&self) -> Result<()> {
        let conn = self.conn().await?;
        let guard = conn.lock();
        guard
            .execute("DELETE FROM cache_entries", [])
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_upsert_delete() {
        let rows = SqliteRowStore::new(":memory:");

        assert_eq!(rows.find("k").await.unwrap(), None);

        rows.upsert(CacheRow {
            key: "k".to_string(),
            value: "\"v\"".to_string(),
            expires_at: None,
        })
        .await
        .unwrap();

        let row = rows.find("k").await.unwrap().unwrap();
        assert_eq!(row.value, "\"v\"");
        assert_eq!(row.expires_at, None);

        assert!(rows.delete("k").await.unwrap());
        assert!(!rows.delete("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_upsert_replaces() {
        let rows = SqliteRowStore::new(":memory:");

        rows.upsert(CacheRow {
            key: "k".to_string(),
            value: "1".to_string(),
            expires_at: None,
        })
        .await
        .unwrap();
        rows.upsert(CacheRow {
            key: "k".to_string(),
            value: "2".to_string(),
            expires_at: Some(123),
        })
        .await
        .unwrap();

        let row = rows.find("k").await.unwrap().unwrap();
        assert_eq!(row.value, "2");
        assert_eq!(row.expires_at, Some(123));
    }

    #[tokio::test]
    async fn test_delete_all() {
        let rows = SqliteRowStore::new(":memory:");
        for key in ["a", "b"] {
            rows.upsert(CacheRow {
                key: key.to_string(),
                value: "0".to_string(),
                expires_at: None,
            })
            .await
            .unwrap();
        }

        rows.delete_all().await.unwrap();
        assert_eq!(rows.find("a").await.unwrap(), None);
        assert_eq!(rows.find("b").await.unwrap(), None);
    }
}
