//! TTL arguments and their resolution into a concrete expiry.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Function deriving a TTL from the value being written.
pub type TtlFn = Arc<dyn Fn(&Value) -> Option<Duration> + Send + Sync>;

/// Per-write TTL argument.
///
/// Passing `None` where an `Option<Ttl>` is expected means "use the store's
/// configured default".
///
/// # Example
///
/// ```
/// use redis_cache_store::Ttl;
/// use std::time::Duration;
///
/// let fixed = Ttl::from(Duration::from_secs(30));
/// let per_value = Ttl::computed(|value| {
///     if value.is_array() {
///         Some(Duration::from_secs(5))
///     } else {
///         Some(Duration::from_secs(60))
///     }
/// });
/// # let _ = (fixed, per_value);
/// ```
#[derive(Clone)]
pub enum Ttl {
    /// Fixed duration. `Duration::ZERO` writes the entry without expiry,
    /// even when a default TTL is configured.
    Fixed(Duration),
    /// Duration computed from the value. Returning `None` writes without expiry.
    Computed(TtlFn),
}

impl Ttl {
    /// Fixed TTL in whole seconds.
    pub fn secs(secs: u64) -> Self {
        Ttl::Fixed(Duration::from_secs(secs))
    }

    /// TTL derived from the value at write time.
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Option<Duration> + Send + Sync + 'static,
    {
        Ttl::Computed(Arc::new(f))
    }

    fn for_value(&self, value: &Value) -> Option<Duration> {
        match self {
            Ttl::Fixed(d) => Some(*d),
            Ttl::Computed(f) => f(value),
        }
    }
}

impl From<Duration> for Ttl {
    fn from(d: Duration) -> Self {
        Ttl::Fixed(d)
    }
}

impl fmt::Debug for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ttl::Fixed(d) => f.debug_tuple("Fixed").field(d).finish(),
            Ttl::Computed(_) => f.write_str("Computed(<fn>)"),
        }
    }
}

/// Resolve a write's TTL to whole seconds, or `None` for "no expiry".
///
/// The explicit argument wins over `default`. Sub-second remainders round up
/// so a non-zero duration never turns into a persistent entry.
pub(crate) fn resolve(explicit: Option<&Ttl>, default: Option<Duration>, value: &Value) -> Option<u64> {
    let ttl = match explicit {
        Some(ttl) => ttl.for_value(value),
        None => default,
    };
    ttl.and_then(expiry_secs)
}

/// Resolve a bulk write's TTL. Bulk writes take a single plain duration.
pub(crate) fn resolve_bulk(explicit: Option<Duration>, default: Option<Duration>) -> Option<u64> {
    explicit.or(default).and_then(expiry_secs)
}

fn expiry_secs(d: Duration) -> Option<u64> {
    if d.is_zero() {
        return None;
    }
    let secs = d.as_secs();
    if d.subsec_nanos() > 0 {
        Some(secs.saturating_add(1))
    } else {
        Some(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_explicit_ttl_wins_over_default() {
        let ttl = Ttl::secs(10);
        assert_eq!(
            resolve(Some(&ttl), Some(Duration::from_secs(60)), &json!(1)),
            Some(10)
        );
    }

    #[test]
    fn test_default_ttl_when_omitted() {
        assert_eq!(resolve(None, Some(Duration::from_secs(60)), &json!(1)), Some(60));
        assert_eq!(resolve(None, None, &json!(1)), None);
    }

    #[test]
    fn test_zero_means_no_expiry() {
        let ttl = Ttl::Fixed(Duration::ZERO);
        assert_eq!(resolve(Some(&ttl), Some(Duration::from_secs(60)), &json!(1)), None);
        assert_eq!(resolve_bulk(None, Some(Duration::ZERO)), None);
    }

    #[test]
    fn test_computed_ttl_sees_value() {
        let ttl = Ttl::computed(|v| v.as_u64().map(Duration::from_secs));
        assert_eq!(resolve(Some(&ttl), None, &json!(42)), Some(42));
        // A computed `None` does not fall back to the default.
        assert_eq!(resolve(Some(&ttl), Some(Duration::from_secs(5)), &json!("x")), None);
    }

    #[test]
    fn test_sub_second_rounds_up() {
        assert_eq!(resolve_bulk(Some(Duration::from_millis(1500)), None), Some(2));
        assert_eq!(resolve_bulk(Some(Duration::from_millis(1)), None), Some(1));
        assert_eq!(resolve_bulk(Some(Duration::from_secs(3)), None), Some(3));
    }

    #[test]
    fn test_huge_duration_saturates() {
        assert_eq!(resolve_bulk(Some(Duration::MAX), None), Some(u64::MAX));
        let ttl = Ttl::Fixed(Duration::MAX);
        assert_eq!(resolve(Some(&ttl), None, &json!(1)), Some(u64::MAX));
    }

    #[test]
    fn test_debug_output() {
        assert_eq!(format!("{:?}", Ttl::secs(1)), "Fixed(1s)");
        assert_eq!(format!("{:?}", Ttl::computed(|_| None)), "Computed(<fn>)");
    }
}
