//! Compute-if-absent with `remember`

use std::time::Duration;
use trove::prelude::*;

async fn expensive_lookup() -> Vec<String> {
    // Stands in for a database query or remote call.
    tokio::time::sleep(Duration::from_millis(200)).await;
    vec!["basic".to_string(), "pro".to_string(), "enterprise".to_string()]
}

#[tokio::main]
async fn main() {
    let config = CacheConfig::with_store(StoreKind::InMemory).prefix("demo_");
    let cache = CacheManager::new(config);

    println!("First call computes...");
    let plans = cache
        .remember("plans", Duration::from_secs(600), expensive_lookup)
        .await;
    println!("plans = {plans:?}");

    println!("Second call hits the cache (no sleep)...");
    let plans = cache
        .remember("plans", Duration::from_secs(600), expensive_lookup)
        .await;
    println!("plans = {plans:?}");
}
