//! Canonical-bytes serialisation.
//!
//! Two payloads that are semantically equal MUST hash to the same [`crate::Hash`].
//! `serde_json` preserves field insertion order, so two producers that built an
//! equal map in different orders would otherwise serialise to different bytes.
//! [`canonicalize`] walks a `serde_json::Value` and re-sorts every object's keys
//! before re-serialising, which is the "stable map-key ordering" the spec
//! requires of hash producers.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CanonicalizeError {
    #[error("serialising value to JSON: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Serialise `value` to JSON with every object's keys in sorted order.
pub fn canonicalize<T: Serialize>(value: &T) -> Result<Vec<u8>, CanonicalizeError> {
    let value = serde_json::to_value(value)?;
    let sorted = sort_keys(value);
    Ok(serde_json::to_vec(&sorted)?)
}

/// Same as [`canonicalize`] but starting from an already-parsed [`Value`],
/// for callers hashing raw agent-supplied bytes (e.g. a remote config body)
/// that may or may not already be canonical.
pub fn canonicalize_value(value: Value) -> Vec<u8> {
    serde_json::to_vec(&sort_keys(value)).expect("serializing a Value cannot fail")
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        Value::Object(map) => {
            let mut sorted: std::collections::BTreeMap<String, Value> =
                std::collections::BTreeMap::new();
            for (k, v) in map {
                sorted.insert(k, sort_keys(v));
            }
            let mut out = serde_json::Map::new();
            for (k, v) in sorted {
                out.insert(k, v);
            }
            Value::Object(out)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reorders_object_keys_deterministically() {
        let a = json!({"b": 1, "a": {"z": 1, "y": 2}});
        let b = json!({"a": {"y": 2, "z": 1}, "b": 1});
        assert_eq!(canonicalize_value(a), canonicalize_value(b));
    }

    #[test]
    fn distinguishes_different_values() {
        let a = json!({"a": 1});
        let b = json!({"a": 2});
        assert_ne!(canonicalize_value(a), canonicalize_value(b));
    }
}
