//! Store client abstraction and implementations.
//!
//! A [`CacheStore`](crate::CacheStore) never talks to a connection directly; it
//! issues commands through a [`StoreClient`]. Clients own connectivity,
//! pooling, timeouts and wire encoding.

use crate::error::Result;
use futures::stream::BoxStream;
use std::future::Future;

#[cfg(feature = "inmemory")]
pub mod inmemory;
#[cfg(feature = "redis")]
pub mod redis;

#[cfg(feature = "inmemory")]
mod pattern;

#[cfg(feature = "inmemory")]
pub use inmemory::InMemoryClient;
#[cfg(feature = "redis")]
pub use redis::{RedisClient, RedisConfig};

/// Reply of [`StoreClient::ttl`] for a key that exists without expiry.
pub const TTL_NO_EXPIRY: i64 = -1;

/// Reply of [`StoreClient::ttl`] for a key that does not exist.
pub const TTL_MISSING: i64 = -2;

/// A write queued in a [`Batch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchCommand {
    /// Write without expiry.
    Set { key: String, value: String },
    /// Write with an expiry in seconds.
    SetEx {
        key: String,
        value: String,
        secs: u64,
    },
}

/// Batched command group: writes queued here are executed by
/// [`StoreClient::exec_atomic`] as one indivisible unit.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    commands: Vec<BatchCommand>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Batch {
            commands: Vec::with_capacity(capacity),
        }
    }

    /// Queue a write without expiry.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.commands.push(BatchCommand::Set {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Queue a write that expires after `secs` seconds.
    pub fn set_ex(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        secs: u64,
    ) -> &mut Self {
        self.commands.push(BatchCommand::SetEx {
            key: key.into(),
            value: value.into(),
            secs,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[BatchCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<BatchCommand> {
        self.commands
    }
}

/// Minimal capability set a backing store client must provide.
///
/// Implementations are shared across concurrent callers and must not rely on
/// the caller for locking.
pub trait StoreClient: Send + Sync + 'static {
    /// Raw payload stored at `key`, or `None` if missing or expired.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Store `value` under `key` without expiry, replacing any previous entry.
    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<()>> + Send;

    /// Store `value` under `key`, expiring after `secs` seconds.
    fn set_ex(&self, key: &str, value: String, secs: u64)
        -> impl Future<Output = Result<()>> + Send;

    /// Delete `keys`, returning how many existed. Missing keys are not an error.
    fn del(&self, keys: &[String]) -> impl Future<Output = Result<u64>> + Send;

    /// Store all pairs without expiry in one command.
    fn mset(&self, pairs: &[(String, String)]) -> impl Future<Output = Result<()>> + Send;

    /// Raw payloads for `keys`, positionally aligned.
    fn mget(&self, keys: &[String]) -> impl Future<Output = Result<Vec<Option<String>>>> + Send;

    /// Lazily enumerate keys matching a glob-style `pattern`.
    fn scan(&self, pattern: &str) -> BoxStream<'static, Result<String>>;

    /// Remaining TTL in seconds, [`TTL_NO_EXPIRY`] or [`TTL_MISSING`].
    fn ttl(&self, key: &str) -> impl Future<Output = Result<i64>> + Send;

    /// Remove every key in the store's namespace.
    fn flush_all(&self) -> impl Future<Output = Result<()>> + Send;

    /// Execute all queued writes as one indivisible unit.
    fn exec_atomic(&self, batch: Batch) -> impl Future<Output = Result<()>> + Send;
}
