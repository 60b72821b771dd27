//! Basic usage example of the cache store.
//!
//! Runs against the in-process client. Build with `--features redis` and set
//! `REDIS_URL` to run the same steps against a Redis server.

use redis_cache_store::{error::Result, CacheStore, StoreClient, StoreConfig, Ttl};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Example entity: Employment
#[derive(Clone, Serialize, Deserialize, Debug)]
struct Employment {
    id: String,
    employer_name: String,
    salary: f64,
}

async fn run<C: StoreClient>(store: CacheStore<C>) -> Result<()> {
    // 1. Write with the default TTL
    println!("1. Caching employment emp_001 with the default TTL...");
    let employment = Employment {
        id: "emp_001".to_string(),
        employer_name: "Acme Corp".to_string(),
        salary: 75000.0,
    };
    store.set("employment:emp_001", &employment, None).await?;
    println!(
        "   ✓ Cached, TTL now {}s\n",
        store.ttl("employment:emp_001").await?
    );

    // 2. Read it back
    println!("2. Reading employment emp_001:");
    if let Some(emp) = store.get::<Employment>("employment:emp_001").await? {
        println!(
            "   ✓ Employment loaded from cache: {} (${:.2})\n",
            emp.employer_name, emp.salary
        );
    }

    // 3. Rejected value
    println!("3. Writing a null value:");
    match store.set("employment:none", &serde_json::Value::Null, None).await {
        Err(e) => println!("   ✓ Rejected before any store command: {}\n", e),
        Ok(()) => println!("   ✗ Unexpectedly cached\n"),
    }

    // 4. Bulk write with explicit TTL
    println!("4. Bulk write with a 30s TTL:");
    store
        .mset(
            &[("session:a", "alice"), ("session:b", "bob")],
            Some(Duration::from_secs(30)),
        )
        .await?;
    let sessions: Vec<Option<String>> = store
        .mget(&["session:a", "session:missing", "session:b"])
        .await?;
    println!("   ✓ MGET -> {:?}\n", sessions);

    // 5. Value-derived TTL
    println!("5. Value-derived TTL:");
    let by_salary = Ttl::computed(|v| {
        let salary = v["salary"].as_f64().unwrap_or_default();
        Some(Duration::from_secs(if salary > 80000.0 { 3600 } else { 600 }))
    });
    store.set("employment:emp_002", &employment, Some(by_salary)).await?;
    println!(
        "   ✓ TTL for emp_002: {}s\n",
        store.ttl("employment:emp_002").await?
    );

    // 6. Callback style
    println!("6. Callback style read:");
    let (tx, rx) = tokio::sync::oneshot::channel();
    store.get_with_callback::<Employment, _>("employment:emp_001", move |result| {
        let _ = tx.send(result);
    });
    if let Ok(Ok(Some(emp))) = rx.await {
        println!("   ✓ Callback received {}\n", emp.id);
    }

    // 7. Enumerate and reset
    println!("7. Keys and reset:");
    let mut keys = store.collect_keys("employment:*").await?;
    keys.sort();
    println!("   ✓ employment keys: {:?}", keys);
    store.reset().await?;
    println!(
        "   ✓ After reset: {} keys\n",
        store.collect_keys("*").await?.len()
    );

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Debug)
        .try_init()
        .ok();

    println!("\n=== Redis Cache Store - Basic Example ===\n");

    let config = StoreConfig::default().with_ttl(Duration::from_secs(300));

    #[cfg(feature = "redis")]
    {
        let store = redis_cache_store::redis_store(redis_cache_store::RedisConfig::from_env(), config)?;
        run(store).await?;
    }

    #[cfg(not(feature = "redis"))]
    {
        let store = CacheStore::new(redis_cache_store::InMemoryClient::new(), config);
        run(store).await?;
    }

    println!("=== Example Complete ===\n");

    Ok(())
}
