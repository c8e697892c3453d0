//! `Item`: a stored entity, per §3.

use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical id representation. Per DESIGN.md's Open Question decision,
/// a resource's `id` field validator fixes which variant is used; a
/// resource never mixes the two.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    String(String),
    Integer(i64),
}

impl ItemId {
    pub fn from_value(value: &Value) -> Option<Self> {
        if let Some(s) = value.as_str() {
            return Some(Self::String(s.to_string()));
        }
        if let Some(n) = value.as_i64() {
            return Some(Self::Integer(n));
        }
        None
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Integer(n) => Value::from(*n),
        }
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => write!(f, "{}", s),
            Self::Integer(n) => write!(f, "{}", n),
        }
    }
}

/// An opaque stable digest of an item's payload, per §4.7: MD5 hex over a
/// deterministic serialization (lexicographic keys, canonical numeric
/// form), rendered as `W/"<hex>"`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ETag(pub String);

impl ETag {
    /// Compute the digest over a payload.
    pub fn compute(payload: &Value) -> Self {
        let canonical = canonicalize(payload);
        let mut hasher = Md5::new();
        hasher.update(canonical.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Render as the weak ETag header value: `W/"<hex>"`.
    pub fn weak(&self) -> String {
        format!("W/\"{}\"", self.0)
    }

    /// Parse an `If-Match`/`If-None-Match` header value, stripping the
    /// weak prefix if present, for comparison against `self.0`.
    pub fn matches_header_value(&self, header: &str) -> bool {
        let trimmed = header.trim();
        let unwrapped = trimmed.strip_prefix("W/").unwrap_or(trimmed);
        let unquoted = unwrapped.trim_matches('"');
        unquoted == self.0
    }
}

/// Serialize a JSON value with lexicographically sorted object keys so
/// the digest is stable regardless of insertion order.
fn canonicalize(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = String::from("{");
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(key).unwrap());
                out.push(':');
                out.push_str(&canonicalize(&map[*key]));
            }
            out.push('}');
            out
        }
        Value::Array(items) => {
            let mut out = String::from("[");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&canonicalize(item));
            }
            out.push(']');
            out
        }
        other => other.to_string(),
    }
}

/// A stored entity: id, etag, last-updated timestamp, and payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub etag: ETag,
    pub updated: DateTime<Utc>,
    pub payload: Value,
}

impl Item {
    /// Build a new item, computing its ETag from the payload and
    /// stamping `updated` to now, per §3 ("`Updated` is set to 'now' at
    /// every successful write").
    pub fn new(id: ItemId, payload: Value) -> Self {
        let etag = ETag::compute(&payload);
        Self {
            id,
            etag,
            updated: Utc::now(),
            payload,
        }
    }

    /// Re-stamp the item after a payload change.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.etag = ETag::compute(&payload);
        self.updated = Utc::now();
        self.payload = payload;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_etag_scenario_1() {
        // §8 scenario 1: stored payload {id:2,foo:"baz",bar:"baz"}
        let payload = json!({"id": "2", "foo": "baz", "bar": "baz"});
        let etag = ETag::compute(&payload);
        assert_eq!(etag.weak(), "W/\"53c7f8b8a84dd407e1491f5339fca757\"");
    }

    #[test]
    fn test_etag_scenario_6() {
        let payload = json!({"id": "6", "foo": "odd", "aar": ["baz", "value-1"]});
        let etag = ETag::compute(&payload);
        assert_eq!(etag.weak(), "W/\"ad278e57a1abd1794df1ce05519639b2\"");
    }

    #[test]
    fn test_etag_key_order_independent() {
        let a = ETag::compute(&json!({"a": 1, "b": 2}));
        let b = ETag::compute(&json!({"b": 2, "a": 1}));
        assert_eq!(a, b);
    }

    #[test]
    fn test_matches_header_value_weak_and_strong() {
        let etag = ETag("abc123".into());
        assert!(etag.matches_header_value("W/\"abc123\""));
        assert!(etag.matches_header_value("\"abc123\""));
        assert!(!etag.matches_header_value("\"different\""));
    }
}
