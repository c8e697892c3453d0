//! Field validators: a closed sum type over the value kinds a `Field` can
//! hold, per §3/§9 ("the validator is a closed sum type; prefer tagged
//! variants with explicit dispatch per variant over open interface
//! hierarchies").

use super::{Field, Schema};
use crate::error::{Error, Issues, Result};
use chrono::DateTime;
use serde_json::Value;

/// A reference target, resolved once at bind time into a direct handle
/// rather than re-resolved by path on every validation (§9: "Tree
/// ownership... resolve them once at bind time into direct handles").
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferencePath(pub String);

/// Checks that a referenced id actually exists in the target resource.
/// Implemented by the `Index` and passed in at validation time — never
/// captured by the validator's identity (§9).
pub trait ReferenceChecker {
    fn exists(&self, target: &ReferencePath, id: &Value) -> bool;
}

/// The closed set of field validators.
#[derive(Clone, Debug)]
pub enum Validator {
    String {
        min_len: Option<usize>,
        max_len: Option<usize>,
        regexp: Option<regex::Regex>,
        allowed: Option<Vec<String>>,
    },
    Integer {
        allowed: Option<Vec<i64>>,
    },
    Float,
    Bool,
    Time,
    Null,
    Url,
    Password {
        min_len: Option<usize>,
    },
    Dict,
    Array {
        values: Box<Field>,
    },
    Object {
        schema: Schema,
    },
    Reference {
        target: ReferencePath,
    },
}

impl Validator {
    pub fn string() -> Self {
        Self::String {
            min_len: None,
            max_len: None,
            regexp: None,
            allowed: None,
        }
    }

    pub fn integer() -> Self {
        Self::Integer { allowed: None }
    }

    pub fn array(values: Field) -> Self {
        Self::Array {
            values: Box::new(values),
        }
    }

    pub fn object(schema: Schema) -> Self {
        Self::Object { schema }
    }

    pub fn reference(target: impl Into<String>) -> Self {
        Self::Reference {
            target: ReferencePath(target.into()),
        }
    }

    /// Get the sub-schema for compound validators, for navigating nested
    /// field paths (§4.1: `GetField(path) → Field?`).
    pub fn get_field(&self, path: &str) -> Option<&Field> {
        match self {
            Self::Object { schema } => schema.get_field(path),
            Self::Array { values } if path.is_empty() => Some(values.as_ref()),
            Self::Array { values } => values.get_field(path),
            _ => None,
        }
    }

    /// Validate and coerce a single value, per §4.1's non-exhaustive
    /// coercion rules.
    pub fn validate(&self, value: &Value) -> std::result::Result<Value, String> {
        match self {
            Self::String { min_len, max_len, regexp, allowed } => {
                let s = value
                    .as_str()
                    .ok_or_else(|| "not a string".to_string())?
                    .to_string();
                if let Some(min) = min_len {
                    if s.len() < *min {
                        return Err(format!("must be at least {} characters", min));
                    }
                }
                if let Some(max) = max_len {
                    if s.len() > *max {
                        return Err(format!("must be at most {} characters", max));
                    }
                }
                if let Some(re) = regexp {
                    if !re.is_match(&s) {
                        return Err("does not match required pattern".to_string());
                    }
                }
                if let Some(allowed) = allowed {
                    if !allowed.contains(&s) {
                        return Err(format!("must be one of {:?}", allowed));
                    }
                }
                Ok(Value::String(s))
            }
            Self::Integer { allowed } => {
                let n = coerce_integer(value).ok_or_else(|| "not an integer".to_string())?;
                if let Some(allowed) = allowed {
                    if !allowed.contains(&n) {
                        return Err(format!("must be one of {:?}", allowed));
                    }
                }
                Ok(Value::from(n))
            }
            Self::Float => {
                let f = value.as_f64().ok_or_else(|| "not a number".to_string())?;
                Ok(Value::from(f))
            }
            Self::Bool => {
                let b = value.as_bool().ok_or_else(|| "not a boolean".to_string())?;
                Ok(Value::Bool(b))
            }
            Self::Time => {
                let s = value.as_str().ok_or_else(|| "not a string".to_string())?;
                DateTime::parse_from_rfc3339(s)
                    .map_err(|_| "not a valid RFC 3339 timestamp".to_string())?;
                Ok(value.clone())
            }
            Self::Null => {
                if value.is_null() {
                    Ok(Value::Null)
                } else {
                    Err("must be null".to_string())
                }
            }
            Self::Url => {
                let s = value.as_str().ok_or_else(|| "not a string".to_string())?;
                if s.contains("://") {
                    Ok(Value::String(s.to_string()))
                } else {
                    Err("not a valid URL".to_string())
                }
            }
            Self::Password { min_len } => {
                let s = value.as_str().ok_or_else(|| "not a string".to_string())?;
                if let Some(min) = min_len {
                    if s.len() < *min {
                        return Err(format!("must be at least {} characters", min));
                    }
                }
                Ok(Value::String(s.to_string()))
            }
            Self::Dict => {
                if value.is_object() {
                    Ok(value.clone())
                } else {
                    Err("not an object".to_string())
                }
            }
            Self::Array { values } => {
                let arr = value.as_array().ok_or_else(|| "not an array".to_string())?;
                let mut out = Vec::with_capacity(arr.len());
                for item in arr {
                    out.push(
                        values
                            .validator
                            .validate(item)
                            .map_err(|e| format!("invalid array element: {}", e))?,
                    );
                }
                Ok(Value::Array(out))
            }
            Self::Object { schema } => {
                let obj = value.as_object().ok_or_else(|| "not an object".to_string())?;
                let mut issues = Issues::new();
                let mut out = serde_json::Map::new();
                for (name, field) in schema.fields() {
                    if let Some(v) = obj.get(name) {
                        match field.validator.validate(v) {
                            Ok(coerced) => {
                                out.insert(name.clone(), coerced);
                            }
                            Err(e) => {
                                issues.entry(name.clone()).or_default().push(e);
                            }
                        }
                    } else if let Some(default) = &field.default {
                        out.insert(name.clone(), default.clone());
                    } else if field.required {
                        issues.entry(name.clone()).or_default().push("required".to_string());
                    }
                }
                if issues.is_empty() {
                    Ok(Value::Object(out))
                } else {
                    Err(format!("{} sub-field issue(s)", issues.len()))
                }
            }
            Self::Reference { .. } => Ok(value.clone()),
        }
    }

    /// Reference-specific validation against an `Index`-supplied checker
    /// (§4.1: `ValidateFor(value, checker) → error`).
    pub fn validate_for(&self, value: &Value, checker: &dyn ReferenceChecker) -> Result<()> {
        if let Self::Reference { target } = self {
            if !checker.exists(target, value) {
                return Err(Error::unprocessable_field(
                    "Document contains error(s)",
                    "reference",
                    format!("{:?} does not reference an existing item", value),
                ));
            }
        }
        Ok(())
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference { .. })
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, Self::Object { .. } | Self::Array { .. })
    }
}

/// Accept both integral and representable-float inputs, per §4.1.
fn coerce_integer(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    if let Some(f) = value.as_f64() {
        if f.fract() == 0.0 {
            return Some(f as i64);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_integer_accepts_representable_float() {
        let v = Validator::integer();
        assert_eq!(v.validate(&json!(42)).unwrap(), json!(42));
        assert_eq!(v.validate(&json!(42.0)).unwrap(), json!(42));
        assert!(v.validate(&json!(42.5)).is_err());
    }

    #[test]
    fn test_string_len_bounds() {
        let v = Validator::String {
            min_len: Some(2),
            max_len: Some(4),
            regexp: None,
            allowed: None,
        };
        assert!(v.validate(&json!("a")).is_err());
        assert!(v.validate(&json!("ab")).is_ok());
        assert!(v.validate(&json!("abcde")).is_err());
    }

    #[test]
    fn test_time_parses_rfc3339() {
        let v = Validator::Time;
        assert!(v.validate(&json!("2024-01-01T00:00:00Z")).is_ok());
        assert!(v.validate(&json!("not-a-time")).is_err());
    }

    #[test]
    fn test_array_recurses_into_values() {
        let v = Validator::array(Field::new("item", Validator::integer()));
        assert_eq!(v.validate(&json!([1, 2, 3])).unwrap(), json!([1, 2, 3]));
        assert!(v.validate(&json!([1, "x"])).is_err());
    }
}
