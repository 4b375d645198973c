//! Using the Redis store
//!
//! Requires a running Redis server:
//! ```sh
//! docker run --rm -p 6379:6379 redis:7
//! cargo run --example redis_store
//! ```

use std::time::Duration;
use trove::prelude::*;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = CacheConfig::with_store(StoreKind::Redis)
        .prefix("demo_")
        .redis(RedisConfig::new("127.0.0.1", 6379));
    let cache = CacheManager::new(config);

    // The connection pool is built lazily on this first operation.
    if !cache.put("greeting", &"hello".to_string(), Some(Duration::from_secs(60))).await {
        eprintln!("put failed - is Redis running on 127.0.0.1:6379?");
        return;
    }

    println!("greeting = {:?}", cache.get::<String>("greeting").await);

    // Server-native atomic counters.
    println!("counter = {:?}", cache.increment("counter", 1).await);
    println!("counter = {:?}", cache.increment("counter", 5).await);
    println!("counter = {:?}", cache.decrement("counter", 2).await);

    let result = cache.many::<String>(&["greeting", "absent"]).await;
    println!("many = {result:?}");

    cache.flush().await;
}
