//! In-process store client.
//!
//! Mirrors the Redis command semantics the cache store relies on (expiry,
//! glob enumeration, atomic batches) without a server. Expiry uses
//! `tokio::time::Instant`, so tests can drive it with `tokio::time::pause`.

use super::pattern::glob_match;
use super::{Batch, BatchCommand, StoreClient, TTL_MISSING, TTL_NO_EXPIRY};
use crate::error::{Error, Result};
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[derive(Clone, Debug)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn persistent(value: String) -> Self {
        Entry {
            value,
            expires_at: None,
        }
    }

    /// Entry expiring `secs` from now. Fails like Redis when the deadline
    /// is out of range for the clock.
    fn expiring(value: String, secs: u64, command: &str) -> Result<Self> {
        let expires_at = Instant::now()
            .checked_add(Duration::from_secs(secs))
            .ok_or_else(|| {
                Error::BackendError(format!("invalid expire time in '{}' command", command))
            })?;
        Ok(Entry {
            value,
            expires_at: Some(expires_at),
        })
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// In-memory store client backed by a single lock-protected map.
///
/// Clones share the same underlying data, like clones of a pooled client
/// share the same server.
///
/// Expired entries are invisible to every command but stay in the map until
/// they are overwritten, deleted, or purged. Long-running users should call
/// [`InMemoryClient::spawn_purge_task`] (or [`InMemoryClient::purge_expired`]
/// periodically) to reclaim their memory.
///
/// # Example
///
/// ```
/// # use redis_cache_store::backend::{InMemoryClient, StoreClient};
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> redis_cache_store::Result<()> {
/// let client = InMemoryClient::new();
/// client.set("key", "\"value\"".to_string()).await?;
/// assert_eq!(client.get("key").await?, Some("\"value\"".to_string()));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct InMemoryClient {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl InMemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.is_live(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop expired entries. Reads already ignore them; this reclaims memory.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.is_live(now));
        let purged = before - entries.len();
        if purged > 0 {
            debug!("✓ InMemory purged {} expired entries", purged);
        }
        purged
    }

    /// Spawn a background task that purges expired entries every `interval`.
    ///
    /// The task runs until the returned handle is aborted.
    pub fn spawn_purge_task(&self, interval: Duration) -> JoinHandle<()> {
        let client = self.clone();
        tokio::spawn(async move {
            info!(
                "Starting InMemory purge task with interval of {:?}",
                interval
            );
            loop {
                tokio::time::sleep(interval).await;
                client.purge_expired().await;
            }
        })
    }
}

impl StoreClient for InMemoryClient {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        match entries.get(key).filter(|e| e.is_live(now)) {
            Some(entry) => {
                debug!("✓ InMemory GET {} -> HIT", key);
                Ok(Some(entry.value.clone()))
            }
            None => {
                debug!("✓ InMemory GET {} -> MISS", key);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), Entry::persistent(value));
        debug!("✓ InMemory SET {}", key);
        Ok(())
    }

    async fn set_ex(&self, key: &str, value: String, secs: u64) -> Result<()> {
        let entry = Entry::expiring(value, secs, "setex")?;
        self.entries.write().await.insert(key.to_string(), entry);
        debug!("✓ InMemory SETEX {} (TTL: {}s)", key, secs);
        Ok(())
    }

    async fn del(&self, keys: &[String]) -> Result<u64> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let mut deleted = 0;
        for key in keys {
            if let Some(entry) = entries.remove(key) {
                if entry.is_live(now) {
                    deleted += 1;
                }
            }
        }
        debug!("✓ InMemory DEL {} keys ({} existed)", keys.len(), deleted);
        Ok(deleted)
    }

    async fn mset(&self, pairs: &[(String, String)]) -> Result<()> {
        let mut entries = self.entries.write().await;
        for (key, value) in pairs {
            entries.insert(key.clone(), Entry::persistent(value.clone()));
        }
        debug!("✓ InMemory MSET {} keys", pairs.len());
        Ok(())
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        let values = keys
            .iter()
            .map(|key| {
                entries
                    .get(key)
                    .filter(|e| e.is_live(now))
                    .map(|e| e.value.clone())
            })
            .collect();
        debug!("✓ InMemory MGET {} keys", keys.len());
        Ok(values)
    }

    fn scan(&self, pattern: &str) -> BoxStream<'static, Result<String>> {
        let entries = Arc::clone(&self.entries);
        let pattern = pattern.to_string();

        // Snapshot on first poll, then yield one key at a time.
        stream::once(async move {
            let now = Instant::now();
            let entries = entries.read().await;
            let keys: Vec<String> = entries
                .iter()
                .filter(|(key, e)| e.is_live(now) && glob_match(&pattern, key))
                .map(|(key, _)| key.clone())
                .collect();
            debug!("✓ InMemory SCAN {} -> {} keys", pattern, keys.len());
            stream::iter(keys.into_iter().map(Ok::<String, Error>))
        })
        .flatten()
        .boxed()
    }

    async fn ttl(&self, key: &str) -> Result<i64> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        let ttl = match entries.get(key).filter(|e| e.is_live(now)) {
            None => TTL_MISSING,
            Some(Entry {
                expires_at: None, ..
            }) => TTL_NO_EXPIRY,
            Some(Entry {
                expires_at: Some(at),
                ..
            }) => {
                // Round to the nearest second like the Redis TTL command.
                let remaining = at.duration_since(now).as_millis();
                ((remaining + 500) / 1000) as i64
            }
        };
        Ok(ttl)
    }

    async fn flush_all(&self) -> Result<()> {
        self.entries.write().await.clear();
        warn!("⚠ InMemory FLUSHALL executed - all entries cleared!");
        Ok(())
    }

    async fn exec_atomic(&self, batch: Batch) -> Result<()> {
        let count = batch.len();
        // Build every entry first so a rejected command leaves the map untouched.
        let staged = batch
            .into_commands()
            .into_iter()
            .map(|command| -> Result<(String, Entry)> {
                match command {
                    BatchCommand::Set { key, value } => Ok((key, Entry::persistent(value))),
                    BatchCommand::SetEx { key, value, secs } => {
                        Ok((key, Entry::expiring(value, secs, "setex")?))
                    }
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let mut entries = self.entries.write().await;
        entries.extend(staged);
        debug!("✓ InMemory EXEC batch of {} commands", count);
        Ok(())
    }
}
