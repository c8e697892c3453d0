//! RFC 6902 JSON-Patch, applied to a deep copy of the current payload
//! before the result is re-validated in full by `Schema::validate`
//! (§4.6: "no incremental per-op validation").

use crate::error::{Error, Result};
use serde_json::Value;

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOp {
    Test { path: String, value: Value },
    Remove { path: String },
    Add { path: String, value: Value },
    Replace { path: String, value: Value },
    Move { path: String, from: String },
    Copy { path: String, from: String },
}

/// Decode a patch document (a JSON array of ops).
pub fn decode(body: &Value) -> Result<Vec<PatchOp>> {
    serde_json::from_value(body.clone())
        .map_err(|e| Error::BadRequest(format!("Malformed patch: {}", e)))
}

/// Apply a sequence of ops to `target`, mutating it in place.
pub fn apply(target: &mut Value, ops: &[PatchOp]) -> Result<()> {
    for op in ops {
        apply_one(target, op)?;
    }
    Ok(())
}

fn apply_one(target: &mut Value, op: &PatchOp) -> Result<()> {
    match op {
        PatchOp::Test { path, value } => {
            let current = pointer(target, path).ok_or_else(|| patch_error(path))?;
            if current != value {
                return Err(Error::BadRequest(format!("test operation failed at {:?}", path)));
            }
            Ok(())
        }
        PatchOp::Remove { path } => {
            remove(target, path).ok_or_else(|| patch_error(path))?;
            Ok(())
        }
        PatchOp::Add { path, value } => {
            insert(target, path, value.clone())
        }
        PatchOp::Replace { path, value } => {
            let slot = pointer_mut(target, path).ok_or_else(|| patch_error(path))?;
            *slot = value.clone();
            Ok(())
        }
        PatchOp::Move { path, from } => {
            let value = remove(target, from).ok_or_else(|| patch_error(from))?;
            insert(target, path, value)
        }
        PatchOp::Copy { path, from } => {
            let value = pointer(target, from).ok_or_else(|| patch_error(from))?.clone();
            insert(target, path, value)
        }
    }
}

fn patch_error(path: &str) -> Error {
    Error::BadRequest(format!("path {:?} does not exist", path))
}

fn pointer<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    value.pointer(path)
}

fn pointer_mut<'a>(value: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    value.pointer_mut(path)
}

fn remove(target: &mut Value, path: &str) -> Option<Value> {
    let (parent_path, key) = split_pointer(path)?;
    let parent = if parent_path.is_empty() {
        target
    } else {
        target.pointer_mut(&parent_path)?
    };
    match parent {
        Value::Object(map) => map.remove(&key),
        Value::Array(arr) => {
            let index: usize = key.parse().ok()?;
            if index < arr.len() {
                Some(arr.remove(index))
            } else {
                None
            }
        }
        _ => None,
    }
}

fn insert(target: &mut Value, path: &str, value: Value) -> Result<()> {
    let (parent_path, key) = split_pointer(path).ok_or_else(|| patch_error(path))?;
    let parent = if parent_path.is_empty() {
        target
    } else {
        target.pointer_mut(&parent_path).ok_or_else(|| patch_error(path))?
    };
    match parent {
        Value::Object(map) => {
            map.insert(key, value);
            Ok(())
        }
        Value::Array(arr) => {
            if key == "-" {
                arr.push(value);
            } else {
                let index: usize = key.parse().map_err(|_| patch_error(path))?;
                if index > arr.len() {
                    return Err(patch_error(path));
                }
                arr.insert(index, value);
            }
            Ok(())
        }
        _ => Err(patch_error(path)),
    }
}

/// Split a JSON pointer into its parent pointer and final key, unescaping
/// `~1` → `/` and `~0` → `~` on the key.
fn split_pointer(path: &str) -> Option<(String, String)> {
    if path.is_empty() {
        return None;
    }
    let (parent, last) = path.rsplit_once('/')?;
    let key = last.replace("~1", "/").replace("~0", "~");
    Some((parent.to_string(), key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_add_field() {
        let mut doc = json!({"foo": "bar"});
        let ops = decode(&json!([{"op": "add", "path": "/baz", "value": 1}])).unwrap();
        apply(&mut doc, &ops).unwrap();
        assert_eq!(doc, json!({"foo": "bar", "baz": 1}));
    }

    #[test]
    fn test_remove_field() {
        let mut doc = json!({"foo": "bar", "baz": 1});
        let ops = decode(&json!([{"op": "remove", "path": "/baz"}])).unwrap();
        apply(&mut doc, &ops).unwrap();
        assert_eq!(doc, json!({"foo": "bar"}));
    }

    #[test]
    fn test_replace_field() {
        let mut doc = json!({"foo": "bar"});
        let ops = decode(&json!([{"op": "replace", "path": "/foo", "value": "baz"}])).unwrap();
        apply(&mut doc, &ops).unwrap();
        assert_eq!(doc, json!({"foo": "baz"}));
    }

    #[test]
    fn test_test_operation_mismatch_fails() {
        let mut doc = json!({"foo": "bar"});
        let ops = decode(&json!([{"op": "test", "path": "/foo", "value": "nope"}])).unwrap();
        assert!(apply(&mut doc, &ops).is_err());
    }

    #[test]
    fn test_move_field() {
        let mut doc = json!({"foo": "bar"});
        let ops = decode(&json!([{"op": "move", "path": "/baz", "from": "/foo"}])).unwrap();
        apply(&mut doc, &ops).unwrap();
        assert_eq!(doc, json!({"baz": "bar"}));
    }

    #[test]
    fn test_copy_field() {
        let mut doc = json!({"foo": "bar"});
        let ops = decode(&json!([{"op": "copy", "path": "/baz", "from": "/foo"}])).unwrap();
        apply(&mut doc, &ops).unwrap();
        assert_eq!(doc, json!({"foo": "bar", "baz": "bar"}));
    }

    #[test]
    fn test_add_to_array_end() {
        let mut doc = json!({"items": [1, 2]});
        let ops = decode(&json!([{"op": "add", "path": "/items/-", "value": 3}])).unwrap();
        apply(&mut doc, &ops).unwrap();
        assert_eq!(doc, json!({"items": [1, 2, 3]}));
    }

    #[test]
    fn test_remove_nonexistent_path_fails() {
        let mut doc = json!({"foo": "bar"});
        let ops = decode(&json!([{"op": "remove", "path": "/missing"}])).unwrap();
        assert!(apply(&mut doc, &ops).is_err());
    }
}
