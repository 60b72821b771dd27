//! Value codec between application values and the store's string payloads.
//!
//! Every cached value is stored as its canonical JSON text. The codec works on
//! [`serde_json::Value`] so the cacheability predicate can inspect the same
//! representation that ends up in the store.
//!
//! # Format
//!
//! ```text
//! {"a":1}        object
//! [1,2,3]        array
//! "text"         string
//! null           JSON null
//! "undefined"    sentinel for the literal undefined value
//! ```
//!
//! The undefined sentinel is the JSON string `"undefined"` (quotes included),
//! so every encoded payload is non-empty and parseable. It decodes back to the
//! string `undefined`, never to `null`.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Payload written for the literal undefined value.
pub const UNDEFINED_SENTINEL: &str = "\"undefined\"";

/// Encode a value into its stored text form.
///
/// `None` stands for the undefined value and yields [`UNDEFINED_SENTINEL`].
///
/// # Errors
///
/// Returns `Error::SerializationError` if JSON encoding fails.
pub fn encode(value: Option<&Value>) -> Result<String> {
    match value {
        Some(value) => serde_json::to_string(value)
            .map_err(|e| Error::SerializationError(format!("Failed to encode value: {}", e))),
        None => Ok(UNDEFINED_SENTINEL.to_string()),
    }
}

/// Decode a stored payload.
///
/// `None` means the store holds no entry and maps to the absent-marker `Ok(None)`.
///
/// # Errors
///
/// Returns `Error::DeserializationError` for malformed payloads. A corrupted
/// entry is never reported as absent.
pub fn decode(raw: Option<&str>) -> Result<Option<Value>> {
    match raw {
        Some(raw) => serde_json::from_str(raw).map(Some).map_err(|e| {
            Error::DeserializationError(format!("Malformed cache payload {:?}: {}", raw, e))
        }),
        None => Ok(None),
    }
}

/// Convert any serde value into the JSON value the codec and predicate operate on.
///
/// # Errors
///
/// Returns `Error::SerializationError` for values JSON cannot express
/// (maps with non-string keys, for example).
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| Error::SerializationError(format!("Value is not JSON-representable: {}", e)))
}

/// Convert a decoded JSON value into the caller's type.
///
/// # Errors
///
/// Returns `Error::DeserializationError` when the stored shape does not match `T`.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        Error::DeserializationError(format!("Cached value does not match requested type: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_encode_json_values() {
        assert_eq!(encode(Some(&json!({"a": 1}))).unwrap(), r#"{"a":1}"#);
        assert_eq!(encode(Some(&json!([1, 2, 3]))).unwrap(), "[1,2,3]");
        assert_eq!(encode(Some(&json!("text"))).unwrap(), r#""text""#);
        assert_eq!(encode(Some(&json!(true))).unwrap(), "true");
        assert_eq!(encode(Some(&Value::Null)).unwrap(), "null");
    }

    #[test]
    fn test_undefined_sentinel_is_distinct_from_null() {
        let undefined = encode(None).unwrap();
        let null = encode(Some(&Value::Null)).unwrap();

        assert_eq!(undefined, UNDEFINED_SENTINEL);
        assert_ne!(undefined, null);
        assert!(!undefined.is_empty());

        // The sentinel is valid JSON and reads back as the string, not as null.
        assert_eq!(decode(Some(&undefined)).unwrap(), Some(json!("undefined")));
    }

    #[test]
    fn test_decode_missing_entry() {
        assert_eq!(decode(None).unwrap(), None);
    }

    #[test]
    fn test_decode_stored_null_is_not_absent() {
        assert_eq!(decode(Some("null")).unwrap(), Some(Value::Null));
    }

    #[test]
    fn test_decode_malformed_payload() {
        let err = decode(Some("{not json")).unwrap_err();
        assert!(matches!(err, Error::DeserializationError(_)));
    }

    #[test]
    fn test_typed_helpers() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Session {
            user: String,
            hits: u32,
        }

        let session = Session {
            user: "alice".to_string(),
            hits: 3,
        };
        let value = to_value(&session).unwrap();
        assert_eq!(value, json!({"user": "alice", "hits": 3}));
        assert_eq!(from_value::<Session>(value).unwrap(), session);

        let err = from_value::<Session>(json!([1, 2])).unwrap_err();
        assert!(matches!(err, Error::DeserializationError(_)));
    }

    #[test]
    fn test_to_value_rejects_non_string_keys() {
        let mut map = std::collections::HashMap::new();
        map.insert(vec![1u8], "v");
        assert!(matches!(
            to_value(&map),
            Err(Error::SerializationError(_))
        ));
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            any::<u64>().prop_map(|n| json!(n)),
            (-1_000_000i64..1_000_000).prop_map(|n| Value::from(n as f64 / 4.0)),
            ".*".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
                prop::collection::btree_map("[a-z_]{0,8}", inner, 0..8)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(value in arb_json()) {
            let raw = encode(Some(&value)).unwrap();
            prop_assert!(!raw.is_empty());
            prop_assert_eq!(decode(Some(&raw)).unwrap(), Some(value));
        }
    }
}
