//! # redis-cache-store
//!
//! A key/value cache store backed by Redis, with JSON values, configurable
//! TTL policies and a cacheability guard on every write.
//!
//! ## Features
//!
//! - **Uniform contract:** `get`, `set`, `mget`, `mset`, `del`, `mdel`, `ttl`, `keys`, `reset`
//! - **JSON values:** Cache any `serde` type; payloads are canonical JSON text
//! - **TTL policies:** Per-write fixed or value-derived TTL, falling back to a store default
//! - **Cacheability guard:** A configured predicate rejects values before any store command
//! - **Atomic bulk writes:** TTL'd `mset` runs as a single `MULTI`/`EXEC` batch
//! - **Two invocation styles:** Await the result, or pass a completion callback
//! - **Injected clients:** Redis via `deadpool-redis`, or the in-process client for tests
//!
//! ## Quick Start
//!
//! ```ignore
//! use redis_cache_store::{redis_store, RedisConfig, StoreConfig, Ttl};
//! use std::time::Duration;
//!
//! let store = redis_store(
//!     RedisConfig::from_env(),
//!     StoreConfig::default().with_ttl(Duration::from_secs(600)),
//! )?;
//!
//! store.set("user:1", &user, None).await?;              // default TTL
//! store.set("otp:1", &code, Some(Ttl::secs(30))).await?; // explicit TTL
//! let user: Option<User> = store.get("user:1").await?;
//!
//! store.get_with_callback::<User, _>("user:1", |result| match result {
//!     Ok(user) => println!("cached: {:?}", user),
//!     Err(e) => eprintln!("cache error: {}", e),
//! });
//! ```

#[macro_use]
extern crate log;

pub mod backend;
pub mod callback;
pub mod config;
pub mod error;
pub mod serialization;
pub mod store;
pub mod ttl;

// Re-exports for convenience
pub use backend::{Batch, StoreClient, TTL_MISSING, TTL_NO_EXPIRY};
pub use config::StoreConfig;
pub use error::{Error, Result};
pub use store::{CacheStore, ALL_KEYS};
pub use ttl::Ttl;

#[cfg(feature = "inmemory")]
pub use backend::InMemoryClient;
#[cfg(feature = "redis")]
pub use backend::{RedisClient, RedisConfig};
#[cfg(feature = "redis")]
pub use store::{redis_ins_store, redis_store, RedisStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
