//! The sort DSL (§4.2): a comma-separated list of field names, each
//! optionally prefixed with `-` for descending order.

use serde_json::Value;
use std::cmp::Ordering;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortTerm {
    pub field: String,
    pub descending: bool,
}

impl SortTerm {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }
}

/// Compare two payloads by a sequence of sort terms, in order.
pub fn compare(terms: &[SortTerm], a: &Value, b: &Value) -> Ordering {
    for term in terms {
        let av = value_at(a, &term.field);
        let bv = value_at(b, &term.field);
        let ord = compare_values(av, bv);
        let ord = if term.descending { ord.reverse() } else { ord };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn value_at<'a>(payload: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = payload;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => {
            if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
                return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            }
            if let (Some(x), Some(y)) = (a.as_str(), b.as_str()) {
                return x.cmp(y);
            }
            if let (Some(x), Some(y)) = (a.as_bool(), b.as_bool()) {
                return x.cmp(&y);
            }
            Ordering::Equal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_compare_ascending() {
        let terms = vec![SortTerm::ascending("age")];
        assert_eq!(compare(&terms, &json!({"age": 1}), &json!({"age": 2})), Ordering::Less);
    }

    #[test]
    fn test_compare_descending() {
        let terms = vec![SortTerm::descending("age")];
        assert_eq!(compare(&terms, &json!({"age": 1}), &json!({"age": 2})), Ordering::Greater);
    }

    #[test]
    fn test_compare_multi_key_tiebreak() {
        let terms = vec![SortTerm::ascending("a"), SortTerm::descending("b")];
        let x = json!({"a": 1, "b": 1});
        let y = json!({"a": 1, "b": 2});
        assert_eq!(compare(&terms, &x, &y), Ordering::Greater);
    }

    #[test]
    fn test_compare_missing_sorts_first() {
        let terms = vec![SortTerm::ascending("age")];
        assert_eq!(compare(&terms, &json!({}), &json!({"age": 1})), Ordering::Less);
    }
}
