//! trove-storage: Storage backends for trove
//!
//! Three interchangeable [`CacheStore`](trove_core::CacheStore)
//! implementations: an in-process map, a SQLite-backed table, and a Redis
//! client. Each backend owns its own connection lifecycle and absorbs its
//! own faults.

pub mod database;
pub mod memory;
pub mod redis;

pub use database::{CacheRow, DatabaseConfig, DatabaseStore, RowStore, SqliteRowStore};
pub use memory::MemoryStore;
pub use self::redis::{RedisConfig, RedisStore};
