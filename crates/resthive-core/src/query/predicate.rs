//! The parsed, typed form of a filter (§4.2): a sequence of expressions,
//! each able to evaluate itself in-memory against a payload.
//!
//! Modeled as a closed sum type the way
//! `170b556f_flitbit-avocado__src-dsl-filter.rs.rs`'s `Filter` enum shapes
//! a MongoDB-style filter DSL, narrowed to the comparison/set/regex/
//! boolean operators §4.2 names.

use regex::Regex;
use serde_json::Value;

/// A single filter expression.
#[derive(Clone, Debug)]
pub enum Expr {
    Equal { field: String, value: Value },
    NotEqual { field: String, value: Value },
    GreaterThan { field: String, value: Value },
    GreaterOrEqual { field: String, value: Value },
    LowerThan { field: String, value: Value },
    LowerOrEqual { field: String, value: Value },
    In { field: String, values: Vec<Value> },
    NotIn { field: String, values: Vec<Value> },
    Regex { field: String, pattern: Regex },
    Exists { field: String, exists: bool },
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

/// The normalized, canonical predicate: an implicit top-level `$and`.
pub type Predicate = Vec<Expr>;

impl Expr {
    /// Evaluate this expression against a payload object, per §4.2's
    /// in-memory predicate evaluation.
    pub fn matches(&self, payload: &Value) -> bool {
        match self {
            Self::Equal { field, value } => value_at(payload, field)
                .map(|v| values_equal(&v, value))
                .unwrap_or(false),
            Self::NotEqual { field, value } => value_at(payload, field)
                .map(|v| !values_equal(&v, value))
                .unwrap_or(true),
            Self::GreaterThan { field, value } => compare(payload, field, value) == Some(std::cmp::Ordering::Greater),
            Self::GreaterOrEqual { field, value } => {
                matches!(compare(payload, field, value), Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal))
            }
            Self::LowerThan { field, value } => compare(payload, field, value) == Some(std::cmp::Ordering::Less),
            Self::LowerOrEqual { field, value } => {
                matches!(compare(payload, field, value), Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal))
            }
            Self::In { field, values } => value_at(payload, field)
                .map(|v| values.iter().any(|candidate| values_equal(&v, candidate)))
                .unwrap_or(false),
            Self::NotIn { field, values } => value_at(payload, field)
                .map(|v| !values.iter().any(|candidate| values_equal(&v, candidate)))
                .unwrap_or(true),
            Self::Regex { field, pattern } => value_at(payload, field)
                .and_then(|v| v.as_str().map(|s| pattern.is_match(s)))
                .unwrap_or(false),
            Self::Exists { field, exists } => value_at(payload, field).is_some() == *exists,
            Self::And(exprs) => exprs.iter().all(|e| e.matches(payload)),
            Self::Or(exprs) => exprs.iter().any(|e| e.matches(payload)),
        }
    }
}

/// Evaluate a full predicate (implicit `$and` over its top-level terms).
pub fn matches_predicate(predicate: &Predicate, payload: &Value) -> bool {
    predicate.iter().all(|e| e.matches(payload))
}

/// Resolve a dotted field path against a JSON payload.
fn value_at<'a>(payload: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = payload;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Value-equality after type normalization — int64/int/float collapsed,
/// per §4.2.
fn values_equal(a: &Value, b: &Value) -> bool {
    if let (Some(x), Some(y)) = (as_f64(a), as_f64(b)) {
        return x == y;
    }
    a == b
}

fn as_f64(v: &Value) -> Option<f64> {
    v.as_f64()
}

fn compare(payload: &Value, field: &str, value: &Value) -> Option<std::cmp::Ordering> {
    let current = value_at(payload, field)?;
    if let (Some(a), Some(b)) = (current.as_f64(), value.as_f64()) {
        return a.partial_cmp(&b);
    }
    if let (Some(a), Some(b)) = (current.as_str(), value.as_str()) {
        return Some(a.cmp(b));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_equal_normalizes_numeric_types() {
        let expr = Expr::Equal {
            field: "age".into(),
            value: json!(30.0),
        };
        assert!(expr.matches(&json!({"age": 30})));
    }

    #[test]
    fn test_and_composition() {
        let predicate: Predicate = vec![
            Expr::Equal { field: "a".into(), value: json!(1) },
            Expr::Equal { field: "b".into(), value: json!(2) },
        ];
        assert!(matches_predicate(&predicate, &json!({"a": 1, "b": 2})));
        assert!(!matches_predicate(&predicate, &json!({"a": 1, "b": 3})));
    }

    #[test]
    fn test_or_composition() {
        let expr = Expr::Or(vec![
            Expr::Equal { field: "a".into(), value: json!(1) },
            Expr::Equal { field: "a".into(), value: json!(2) },
        ]);
        assert!(expr.matches(&json!({"a": 2})));
        assert!(!expr.matches(&json!({"a": 3})));
    }

    #[test]
    fn test_in_and_not_in() {
        let in_expr = Expr::In { field: "x".into(), values: vec![json!(1), json!(2)] };
        assert!(in_expr.matches(&json!({"x": 2})));
        assert!(!in_expr.matches(&json!({"x": 3})));

        let nin_expr = Expr::NotIn { field: "x".into(), values: vec![json!(1), json!(2)] };
        assert!(nin_expr.matches(&json!({"x": 3})));
    }

    #[test]
    fn test_exists() {
        let expr = Expr::Exists { field: "x".into(), exists: true };
        assert!(expr.matches(&json!({"x": 1})));
        assert!(!expr.matches(&json!({"y": 1})));
    }

    #[test]
    fn test_dotted_field_path() {
        let expr = Expr::Equal { field: "address.city".into(), value: json!("NYC") };
        assert!(expr.matches(&json!({"address": {"city": "NYC"}})));
    }
}
