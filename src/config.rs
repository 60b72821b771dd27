//! Store configuration: default TTL and cacheability predicate.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Predicate deciding whether a value may be written to the cache.
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Default predicate: every value except JSON `null` is cacheable.
pub fn default_is_cacheable(value: &Value) -> bool {
    !value.is_null()
}

/// Configuration captured by a [`CacheStore`](crate::CacheStore) at construction.
///
/// Immutable once handed to the store.
///
/// # Example
///
/// ```
/// use redis_cache_store::StoreConfig;
/// use std::time::Duration;
///
/// let config = StoreConfig::default()
///     .with_ttl(Duration::from_secs(600))
///     .with_is_cacheable(|v| !v.is_null() && v.as_str() != Some(""));
/// assert_eq!(config.ttl, Some(Duration::from_secs(600)));
/// ```
#[derive(Clone)]
pub struct StoreConfig {
    /// TTL applied when a write does not specify one. `None` writes without expiry.
    pub ttl: Option<Duration>,
    /// Cacheability predicate consulted before every write.
    pub is_cacheable: Predicate,
}

impl StoreConfig {
    /// Set the default TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Replace the cacheability predicate.
    pub fn with_is_cacheable<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.is_cacheable = Arc::new(f);
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            ttl: None,
            is_cacheable: Arc::new(default_is_cacheable),
        }
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.ttl, None);
        assert!((config.is_cacheable)(&json!(0)));
        assert!((config.is_cacheable)(&json!("")));
        assert!((config.is_cacheable)(&json!(false)));
        assert!(!(config.is_cacheable)(&Value::Null));
    }

    #[test]
    fn test_custom_predicate() {
        let config = StoreConfig::default().with_is_cacheable(|v| v.is_object());
        assert!((config.is_cacheable)(&json!({"a": 1})));
        assert!(!(config.is_cacheable)(&json!(1)));
    }

    #[test]
    fn test_debug_hides_predicate() {
        let config = StoreConfig::default().with_ttl(Duration::from_secs(5));
        assert_eq!(
            format!("{:?}", config),
            "StoreConfig { ttl: Some(5s), .. }"
        );
    }
}
