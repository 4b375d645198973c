//! Relational-table store
//!
//! One durable row per cache key. The store itself only decides expiry and
//! serialization policy; actual row access goes through the [`RowStore`]
//! collaborator, of which [`SqliteRowStore`] is the shipped implementation.

mod sqlite;
mod store;

use async_trait::async_trait;
use std::path::PathBuf;
use trove_core::Result;

pub use sqlite::SqliteRowStore;
pub use store::DatabaseStore;

/// One persisted cache record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRow {
    /// Cache key, unique within the table
    pub key: String,
    /// Serialized value (JSON text)
    pub value: String,
    /// Absolute expiry as unix epoch milliseconds; `None` means forever
    pub expires_at: Option<i64>,
}

/// Row-level access used by [`DatabaseStore`]
///
/// Implementations perform the actual row read/write against whatever
/// relational storage the application uses.
#[async_trait]
pub trait RowStore: Send + Sync + 'static {
    /// Fetch the row for a key, if any
    async fn find(&self, key: &str) -> Result<Option<CacheRow>>;

    /// Insert or replace the row for `row.key`
    async fn upsert(&self, row: CacheRow) -> Result<()>;

    /// Delete the row for a key
    ///
    /// Returns `true` if a row existed.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Delete every row in the table
    async fn delete_all(&self) -> Result<()>;
}

/// Configuration for the database store
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file (`:memory:` for an in-memory table)
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("cache.db"),
        }
    }
}

impl DatabaseConfig {
    /// Create config pointing at a database file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}
