//! Cache store - the uniform cache contract on top of a store client.

use crate::backend::{Batch, StoreClient};
use crate::callback::spawn_with_callback;
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::serialization;
use crate::ttl::{self, Ttl};
use futures::stream::{BoxStream, TryStreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Pattern matching every key.
pub const ALL_KEYS: &str = "*";

/// Key/value cache over an injected [`StoreClient`].
///
/// Values are stored as JSON text. Every write goes through the configured
/// cacheability predicate before any store command is issued. The store keeps
/// no state of its own; clones share the client and configuration.
///
/// Each operation can be awaited directly or started with a completion
/// callback via its `*_with_callback` twin, which runs the same code.
///
/// # Example
///
/// ```
/// use redis_cache_store::{backend::InMemoryClient, CacheStore, StoreConfig, Ttl};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> redis_cache_store::Result<()> {
/// let store = CacheStore::new(
///     InMemoryClient::new(),
///     StoreConfig::default().with_ttl(Duration::from_secs(300)),
/// );
///
/// store.set("user:1", &serde_json::json!({"name": "Ada"}), None).await?;
/// store.set("token", &"abc", Some(Ttl::secs(30))).await?;
///
/// let user: Option<serde_json::Value> = store.get("user:1").await?;
/// assert_eq!(user.unwrap()["name"], "Ada");
/// # Ok(())
/// # }
/// ```
pub struct CacheStore<C: StoreClient> {
    client: Arc<C>,
    config: Arc<StoreConfig>,
}

impl<C: StoreClient> Clone for CacheStore<C> {
    fn clone(&self) -> Self {
        CacheStore {
            client: Arc::clone(&self.client),
            config: Arc::clone(&self.config),
        }
    }
}

impl<C: StoreClient> CacheStore<C> {
    /// Create a store over `client`.
    pub fn new(client: C, config: StoreConfig) -> Self {
        Self::from_shared(Arc::new(client), config)
    }

    /// Create a store over a client the caller keeps its own handle to.
    pub fn from_shared(client: Arc<C>, config: StoreConfig) -> Self {
        let config = Arc::new(config);
        debug!("» Cache store configured: {:?}", config);
        CacheStore { client, config }
    }

    /// The injected store client.
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Evaluate the configured cacheability predicate.
    pub fn is_cacheable(&self, value: &Value) -> bool {
        (self.config.is_cacheable)(value)
    }

    fn ensure_cacheable(&self, value: &Value) -> Result<()> {
        if self.is_cacheable(value) {
            Ok(())
        } else {
            Err(Error::ValidationError(format!(
                "{} is not a cacheable value",
                value
            )))
        }
    }

    /// Read and decode the value at `key`.
    ///
    /// Returns `Ok(None)` if the key is missing or expired.
    ///
    /// # Errors
    ///
    /// - `Error::BackendError`: the store client failed
    /// - `Error::DeserializationError`: the payload is malformed or does not match `T`
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let raw = self.client.get(key).await?;
        decode_as(raw)
    }

    /// Write `value` under `key`.
    ///
    /// TTL resolution: `ttl` if given (fixed or computed from the value), else
    /// the configured default, else no expiry.
    ///
    /// # Errors
    ///
    /// - `Error::ValidationError`: the predicate rejected the value; nothing was written
    /// - `Error::SerializationError`: the value has no JSON form
    /// - `Error::BackendError`: the store client failed
    pub async fn set<T>(&self, key: &str, value: &T, ttl: Option<Ttl>) -> Result<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        let value = serialization::to_value(value)?;
        self.ensure_cacheable(&value)?;

        let expiry = ttl::resolve(ttl.as_ref(), self.config.ttl, &value);
        let payload = serialization::encode(Some(&value))?;

        match expiry {
            Some(secs) => self.client.set_ex(key, payload, secs).await,
            None => self.client.set(key, payload).await,
        }
    }

    /// Write several entries at once.
    ///
    /// Every value is validated and encoded before any store command, so a
    /// rejected value leaves the store untouched. With an effective TTL the
    /// writes go out as one atomic batch; without one, as a single multi-set.
    /// When a key repeats, its last occurrence wins.
    ///
    /// # Errors
    ///
    /// Same as [`set`](Self::set).
    pub async fn mset<K, T>(&self, entries: &[(K, T)], ttl: Option<Duration>) -> Result<()>
    where
        K: AsRef<str> + Sync,
        T: Serialize + Sync,
    {
        let mut encoded = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let value = serialization::to_value(value)?;
            self.ensure_cacheable(&value)?;
            encoded.push((
                key.as_ref().to_string(),
                serialization::encode(Some(&value))?,
            ));
        }

        if encoded.is_empty() {
            return Ok(());
        }

        match ttl::resolve_bulk(ttl, self.config.ttl) {
            Some(secs) => {
                debug!("» MSET {} entries as atomic batch (TTL: {}s)", encoded.len(), secs);
                let mut batch = Batch::with_capacity(encoded.len());
                for (key, payload) in encoded {
                    batch.set_ex(key, payload, secs);
                }
                self.client.exec_atomic(batch).await
            }
            None => {
                debug!("» MSET {} entries without expiry", encoded.len());
                self.client.mset(&encoded).await
            }
        }
    }

    /// Read several keys. The result is aligned with `keys`, duplicates included.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get); any malformed entry fails the whole call.
    pub async fn mget<K, T>(&self, keys: &[K]) -> Result<Vec<Option<T>>>
    where
        K: AsRef<str> + Sync,
        T: DeserializeOwned,
    {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = keys.iter().map(|k| k.as_ref().to_string()).collect();
        let raw = self.client.mget(&keys).await?;

        if raw.len() != keys.len() {
            return Err(Error::BackendError(format!(
                "MGET returned {} values for {} keys",
                raw.len(),
                keys.len()
            )));
        }

        raw.into_iter().map(decode_as::<T>).collect()
    }

    /// Delete `key`. Deleting a missing key succeeds.
    pub async fn del(&self, key: &str) -> Result<()> {
        self.client.del(&[key.to_string()]).await?;
        Ok(())
    }

    /// Delete every key in `keys`. Missing keys are ignored.
    pub async fn mdel<K: AsRef<str> + Sync>(&self, keys: &[K]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let keys: Vec<String> = keys.iter().map(|k| k.as_ref().to_string()).collect();
        self.client.del(&keys).await?;
        Ok(())
    }

    /// Remaining TTL of `key` in seconds, as reported by the store.
    ///
    /// [`TTL_NO_EXPIRY`](crate::backend::TTL_NO_EXPIRY) marks a key without
    /// expiry and [`TTL_MISSING`](crate::backend::TTL_MISSING) a missing key.
    pub async fn ttl(&self, key: &str) -> Result<i64> {
        self.client.ttl(key).await
    }

    /// Lazily enumerate keys matching a glob-style `pattern`.
    pub fn keys(&self, pattern: &str) -> BoxStream<'static, Result<String>> {
        self.client.scan(pattern)
    }

    /// Lazily enumerate every key.
    pub fn keys_all(&self) -> BoxStream<'static, Result<String>> {
        self.keys(ALL_KEYS)
    }

    /// Collect the keys matching `pattern`.
    pub async fn collect_keys(&self, pattern: &str) -> Result<Vec<String>> {
        self.keys(pattern).try_collect().await
    }

    /// Remove every entry in the store's namespace, not just this store's keys.
    pub async fn reset(&self) -> Result<()> {
        self.client.flush_all().await
    }

    // ------------------------------------------------------------------
    // Completion-callback style
    // ------------------------------------------------------------------

    /// Callback form of [`get`](Self::get).
    pub fn get_with_callback<T, F>(&self, key: impl Into<String>, callback: F) -> JoinHandle<()>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Result<Option<T>>) + Send + 'static,
    {
        let store = self.clone();
        let key = key.into();
        spawn_with_callback(async move { store.get::<T>(&key).await }, callback)
    }

    /// Callback form of [`set`](Self::set).
    pub fn set_with_callback<T, F>(
        &self,
        key: impl Into<String>,
        value: T,
        ttl: Option<Ttl>,
        callback: F,
    ) -> JoinHandle<()>
    where
        T: Serialize + Send + Sync + 'static,
        F: FnOnce(Result<()>) + Send + 'static,
    {
        let store = self.clone();
        let key = key.into();
        spawn_with_callback(async move { store.set(&key, &value, ttl).await }, callback)
    }

    /// Callback form of [`mset`](Self::mset).
    pub fn mset_with_callback<T, F>(
        &self,
        entries: Vec<(String, T)>,
        ttl: Option<Duration>,
        callback: F,
    ) -> JoinHandle<()>
    where
        T: Serialize + Send + Sync + 'static,
        F: FnOnce(Result<()>) + Send + 'static,
    {
        let store = self.clone();
        spawn_with_callback(async move { store.mset(entries.as_slice(), ttl).await }, callback)
    }

    /// Callback form of [`mget`](Self::mget).
    pub fn mget_with_callback<T, F>(&self, keys: Vec<String>, callback: F) -> JoinHandle<()>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Result<Vec<Option<T>>>) + Send + 'static,
    {
        let store = self.clone();
        spawn_with_callback(async move { store.mget::<_, T>(keys.as_slice()).await }, callback)
    }

    /// Callback form of [`del`](Self::del).
    pub fn del_with_callback<F>(&self, key: impl Into<String>, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<()>) + Send + 'static,
    {
        let store = self.clone();
        let key = key.into();
        spawn_with_callback(async move { store.del(&key).await }, callback)
    }

    /// Callback form of [`mdel`](Self::mdel).
    pub fn mdel_with_callback<F>(&self, keys: Vec<String>, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<()>) + Send + 'static,
    {
        let store = self.clone();
        spawn_with_callback(async move { store.mdel(keys.as_slice()).await }, callback)
    }

    /// Callback form of [`ttl`](Self::ttl).
    pub fn ttl_with_callback<F>(&self, key: impl Into<String>, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<i64>) + Send + 'static,
    {
        let store = self.clone();
        let key = key.into();
        spawn_with_callback(async move { store.ttl(&key).await }, callback)
    }

    /// Callback form of [`keys`](Self::keys). The callback receives all matches at once.
    pub fn keys_with_callback<F>(&self, pattern: impl Into<String>, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<Vec<String>>) + Send + 'static,
    {
        let store = self.clone();
        let pattern = pattern.into();
        spawn_with_callback(async move { store.collect_keys(&pattern).await }, callback)
    }

    /// Callback form of [`reset`](Self::reset).
    pub fn reset_with_callback<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<()>) + Send + 'static,
    {
        let store = self.clone();
        spawn_with_callback(async move { store.reset().await }, callback)
    }
}

fn decode_as<T: DeserializeOwned>(raw: Option<String>) -> Result<Option<T>> {
    serialization::decode(raw.as_deref())?
        .map(serialization::from_value)
        .transpose()
}

#[cfg(feature = "redis")]
mod redis_constructors {
    use super::CacheStore;
    use crate::backend::{RedisClient, RedisConfig};
    use crate::config::StoreConfig;
    use crate::error::Result;

    /// Cache store over Redis.
    pub type RedisStore = CacheStore<RedisClient>;

    /// Build a Redis client from connection settings and wrap it in a store.
    ///
    /// # Errors
    /// Returns `Error::ConfigError` if the connection settings are invalid
    pub fn redis_store(redis: RedisConfig, config: StoreConfig) -> Result<RedisStore> {
        let client = RedisClient::new(redis)?;
        Ok(CacheStore::new(client, config))
    }

    /// Wrap an existing Redis client. The caller keeps ownership of its pool.
    pub fn redis_ins_store(client: RedisClient, config: StoreConfig) -> RedisStore {
        CacheStore::new(client, config)
    }
}

#[cfg(feature = "redis")]
pub use redis_constructors::{redis_ins_store, redis_store, RedisStore};
