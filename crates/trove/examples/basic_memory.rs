//! Basic example demonstrating trove with the in-memory store

use std::time::Duration;
use trove::prelude::*;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct User {
    id: u64,
    name: String,
    email: String,
}

#[tokio::main]
async fn main() {
    println!("=== trove Basic Example ===\n");

    let config = CacheConfig::with_store(StoreKind::InMemory).prefix("demo_");
    let cache = CacheManager::new(config);

    let user = User {
        id: 123,
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
    };

    println!("Storing user in cache...");
    cache
        .put("user:123", &user, Some(Duration::from_secs(300)))
        .await;

    println!("Retrieving user from cache...");
    match cache.get::<User>("user:123").await {
        Some(user) => println!("HIT: {} <{}>", user.name, user.email),
        None => println!("MISS"),
    }

    println!("Counting page views...");
    for _ in 0..3 {
        cache.increment("views:home", 1).await;
    }
    println!("views:home = {:?}", cache.get::<i64>("views:home").await);

    println!("Pulling the user (read + delete)...");
    let pulled = cache.pull::<User>("user:123").await;
    println!("pulled = {:?}", pulled.map(|u| u.name));
    println!("after pull = {:?}", cache.get::<User>("user:123").await);
}
