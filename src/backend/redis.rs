//! Redis store client implementation.

use super::{Batch, BatchCommand, StoreClient};
use crate::error::{Error, Result};
use deadpool_redis::redis::{self, AsyncCommands};
use deadpool_redis::{Pool, PoolConfig, Runtime};
use futures::future;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use std::collections::HashSet;
use std::time::Duration;

/// Default Redis connection pool size.
/// Override with the REDIS_POOL_SIZE environment variable.
const DEFAULT_POOL_SIZE: usize = 16;

/// Keys requested per SCAN round trip.
const SCAN_COUNT: usize = 100;

/// Configuration for the Redis client.
#[derive(Clone, Debug)]
pub struct RedisConfig {
    pub url: String, // e.g., "redis://localhost:6379/0"
    pub pool_size: usize,
    pub connection_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        RedisConfig {
            url: "redis://127.0.0.1:6379".to_string(),
            pool_size: DEFAULT_POOL_SIZE,
            connection_timeout: Duration::from_secs(5),
        }
    }
}

impl RedisConfig {
    /// Build a configuration from the environment.
    ///
    /// Reads `REDIS_URL` and `REDIS_POOL_SIZE`; unset or unparsable values
    /// fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = RedisConfig::default();
        let url = std::env::var("REDIS_URL").unwrap_or(defaults.url);
        let pool_size = std::env::var("REDIS_POOL_SIZE")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(defaults.pool_size);

        RedisConfig {
            url,
            pool_size,
            ..defaults
        }
    }
}

/// Redis client over a `deadpool-redis` connection pool.
///
/// Clones share the pool. The cache store only borrows connections per
/// command; the pool's lifecycle stays with whoever created the client.
///
/// # Example
///
/// ```no_run
/// # use redis_cache_store::backend::{RedisClient, RedisConfig, StoreClient};
/// # use redis_cache_store::error::Result;
/// # async fn example() -> Result<()> {
/// let config = RedisConfig {
///     url: "redis://localhost:6379".to_string(),
///     ..Default::default()
/// };
///
/// let client = RedisClient::new(config)?;
/// client.set_ex("key", "\"value\"".to_string(), 60).await?;
/// let value = client.get("key").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RedisClient {
    pool: Pool,
}

impl RedisClient {
    /// Create a client and its connection pool from configuration.
    ///
    /// No connection is opened until the first command.
    ///
    /// # Errors
    /// Returns `Error::ConfigError` if the URL or pool settings are invalid
    pub fn new(config: RedisConfig) -> Result<Self> {
        if config.pool_size == 0 {
            return Err(Error::ConfigError(
                "Redis pool size must be at least 1".to_string(),
            ));
        }

        let mut cfg = deadpool_redis::Config::from_url(config.url.clone());
        let mut pool_config = PoolConfig::new(config.pool_size);
        pool_config.timeouts.wait = Some(config.connection_timeout);
        pool_config.timeouts.create = Some(config.connection_timeout);
        pool_config.timeouts.recycle = Some(config.connection_timeout);
        cfg.pool = Some(pool_config);

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| Error::ConfigError(format!("Failed to create connection pool: {}", e)))?;

        info!(
            "✓ Redis client initialized for {} (pool size: {})",
            config.url, config.pool_size
        );

        Ok(RedisClient { pool })
    }

    /// Create from a URL directly.
    ///
    /// Pool size is determined by:
    /// 1. `REDIS_POOL_SIZE` environment variable (if set)
    /// 2. `DEFAULT_POOL_SIZE` constant (16)
    ///
    /// # Errors
    /// Returns `Err` if connection pool creation fails
    pub fn from_url(url: impl Into<String>) -> Result<Self> {
        let config = RedisConfig {
            url: url.into(),
            ..RedisConfig::from_env()
        };
        Self::new(config)
    }

    /// Wrap a pool the caller already manages.
    pub fn from_pool(pool: Pool) -> Self {
        RedisClient { pool }
    }

    /// Underlying connection pool.
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    async fn conn(&self) -> Result<deadpool_redis::Connection> {
        Ok(self.pool.get().await?)
    }
}

async fn scan_page(pool: &Pool, pattern: &str, cursor: u64) -> Result<(u64, Vec<String>)> {
    let mut conn = pool.get().await?;
    let page: (u64, Vec<String>) = redis::cmd("SCAN")
        .arg(cursor)
        .arg("MATCH")
        .arg(pattern)
        .arg("COUNT")
        .arg(SCAN_COUNT)
        .query_async(&mut conn)
        .await
        .map_err(|e| Error::BackendError(format!("Redis SCAN failed for {}: {}", pattern, e)))?;
    Ok(page)
}

impl StoreClient for RedisClient {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn().await?;

        let value: Option<String> = conn.get(key).await.map_err(|e| {
            Error::BackendError(format!("Redis GET failed for key {}: {}", key, e))
        })?;

        match &value {
            Some(_) => debug!("✓ Redis GET {} -> HIT", key),
            None => debug!("✓ Redis GET {} -> MISS", key),
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let mut conn = self.conn().await?;

        let _: () = conn.set(key, value).await.map_err(|e| {
            Error::BackendError(format!("Redis SET failed for key {}: {}", key, e))
        })?;

        debug!("✓ Redis SET {}", key);
        Ok(())
    }

    async fn set_ex(&self, key: &str, value: String, secs: u64) -> Result<()> {
        let mut conn = self.conn().await?;

        let _: () = conn.set_ex(key, value, secs).await.map_err(|e| {
            Error::BackendError(format!("Redis SETEX failed for key {}: {}", key, e))
        })?;

        debug!("✓ Redis SETEX {} (TTL: {}s)", key, secs);
        Ok(())
    }

    async fn del(&self, keys: &[String]) -> Result<u64> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn().await?;

        let deleted: u64 = conn
            .del(keys)
            .await
            .map_err(|e| Error::BackendError(format!("Redis DEL failed: {}", e)))?;

        debug!("✓ Redis DEL {} keys ({} existed)", keys.len(), deleted);
        Ok(deleted)
    }

    async fn mset(&self, pairs: &[(String, String)]) -> Result<()> {
        if pairs.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn().await?;

        let _: () = conn
            .mset(pairs)
            .await
            .map_err(|e| Error::BackendError(format!("Redis MSET failed: {}", e)))?;

        debug!("✓ Redis MSET {} keys", pairs.len());
        Ok(())
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn().await?;

        // Always MGET, even for one key, so the reply is an array.
        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(keys)
            .query_async(&mut conn)
            .await
            .map_err(|e| Error::BackendError(format!("Redis MGET failed: {}", e)))?;

        debug!("✓ Redis MGET {} keys", keys.len());
        Ok(values)
    }

    fn scan(&self, pattern: &str) -> BoxStream<'static, Result<String>> {
        let pool = self.pool.clone();
        let pattern = pattern.to_string();

        let pages = stream::try_unfold(Some(0u64), move |cursor| {
            let pool = pool.clone();
            let pattern = pattern.clone();
            async move {
                let Some(cursor) = cursor else {
                    return Ok::<_, Error>(None);
                };
                let (next, keys) = scan_page(&pool, &pattern, cursor).await?;
                debug!("✓ Redis SCAN {} cursor {} -> {} keys", pattern, cursor, keys.len());
                let next = if next == 0 { None } else { Some(next) };
                Ok(Some((keys, next)))
            }
        });

        // SCAN may repeat keys across pages.
        let mut seen = HashSet::new();
        pages
            .map_ok(|keys| stream::iter(keys.into_iter().map(Ok::<String, Error>)))
            .try_flatten()
            .try_filter(move |key| future::ready(seen.insert(key.clone())))
            .boxed()
    }

    async fn ttl(&self, key: &str) -> Result<i64> {
        let mut conn = self.conn().await?;

        let ttl: i64 = conn.ttl(key).await.map_err(|e| {
            Error::BackendError(format!("Redis TTL failed for key {}: {}", key, e))
        })?;

        debug!("✓ Redis TTL {} -> {}", key, ttl);

        Ok(ttl)
    }

    async fn flush_all(&self) -> Result<()> {
        let mut conn = self.conn().await?;

        let _: () = redis::cmd("FLUSHALL")
            .query_async(&mut conn)
            .await
            .map_err(|e| Error::BackendError(format!("Redis FLUSHALL failed: {}", e)))?;

        warn!("⚠ Redis FLUSHALL executed - all cache cleared!");
        Ok(())
    }

    async fn exec_atomic(&self, batch: Batch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let count = batch.len();
        let mut pipe = redis::pipe();
        pipe.atomic();
        for command in batch.into_commands() {
            match command {
                BatchCommand::Set { key, value } => {
                    pipe.set(key, value).ignore();
                }
                BatchCommand::SetEx { key, value, secs } => {
                    pipe.set_ex(key, value, secs).ignore();
                }
            }
        }

        let mut conn = self.conn().await?;
        let _: () = pipe
            .query_async(&mut conn)
            .await
            .map_err(|e| Error::BackendError(format!("Redis MULTI/EXEC failed: {}", e)))?;

        debug!("✓ Redis EXEC batch of {} commands", count);
        Ok(())
    }
}
