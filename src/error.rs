//! Error types for cache store operations.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the cache store and its store clients.
///
/// None of these are retried or suppressed internally: a failing operation
/// hands its error straight back to the caller (or to the completion callback).
#[derive(Debug, Error)]
pub enum Error {
    /// A value was rejected by the cacheability predicate.
    /// Raised before any store command is issued.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The store client failed (pool checkout, connection loss, protocol error).
    #[error("Backend error: {0}")]
    BackendError(String),

    /// A stored payload could not be parsed back into a value.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// A value could not be turned into its JSON form.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl Error {
    /// True for errors raised by the cacheability check.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::ValidationError(_))
    }

    /// True for errors that originate in the store client.
    pub fn is_backend(&self) -> bool {
        matches!(self, Error::BackendError(_))
    }
}

#[cfg(feature = "redis")]
impl From<deadpool_redis::redis::RedisError> for Error {
    fn from(e: deadpool_redis::redis::RedisError) -> Self {
        Error::BackendError(e.to_string())
    }
}

#[cfg(feature = "redis")]
impl From<deadpool_redis::PoolError> for Error {
    fn from(e: deadpool_redis::PoolError) -> Self {
        Error::BackendError(format!("Failed to get Redis connection: {}", e))
    }
}
