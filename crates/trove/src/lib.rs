//! trove: pluggable multi-store caching for Rust
//!
//! # Features
//!
//! - **Three interchangeable backends**: in-process memory, SQLite table,
//!   and Redis, selected by name at runtime
//! - **Key namespacing** via a configured prefix
//! - **Composite operations**: `remember`, `pull`, `add`, bulk get/put,
//!   counters
//! - **Fault absorption**: backend failures read as cache misses; only a
//!   misconfigured store name is an error
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use trove::prelude::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = CacheConfig::with_store(StoreKind::InMemory).prefix("app_");
//!     let cache = CacheManager::new(config);
//!
//!     cache.put("answer", &42i32, Some(Duration::from_secs(60))).await;
//!
//!     match cache.get::<i32>("answer").await {
//!         Some(value) => println!("Got: {value}"),
//!         None => println!("Cache miss"),
//!     }
//! }
//! ```

mod config;
mod manager;

// Re-export core
pub use trove_core::*;

// Re-export storage
pub use trove_storage::{
    CacheRow, DatabaseConfig, DatabaseStore, MemoryStore, RedisConfig, RedisStore, RowStore,
    SqliteRowStore,
};

pub use config::CacheConfig;
pub use manager::CacheManager;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        CacheConfig, CacheError, CacheManager, CacheStore, DatabaseConfig, JsonSerializer,
        MemoryStore, RedisConfig, Result, Serializer, StoreKind,
    };

    #[cfg(feature = "msgpack")]
    pub use crate::MsgPackSerializer;
}
