//! Shared pieces of the C6 state machine: query-param decoding and the
//! conditional-request / immutable-id invariant checks used by every
//! mutating method (§4.6).

use crate::error::{Error, Result};
use crate::item::{Item, ItemId};
use crate::query::{parse_filter, parse_projection, parse_sort, Query, Window};
use crate::router::ResourcePath;
use crate::schema::Schema;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;

/// Raw request headers relevant to the pipeline, decoded by the server
/// binding and passed in verbatim.
#[derive(Clone, Debug, Default)]
pub struct RequestHeaders {
    pub content_type: Option<String>,
    pub if_match: Option<String>,
    pub if_none_match: Option<String>,
    pub if_unmodified_since: Option<String>,
    pub prefer_return_minimal: bool,
}

/// Decode a raw request body into JSON, per §4.6's body-handling rules:
/// a non-object merge body, or invalid JSON outright, is a 400.
pub fn decode_body(raw: &[u8]) -> Result<Value> {
    let value: Value = serde_json::from_slice(raw)
        .map_err(|e| Error::BadRequest(format!("Malformed body: {}", describe_json_error(raw, &e))))?;
    Ok(value)
}

/// Render a `serde_json` decode failure the way the original adapter's
/// JSON decoder does: when the body doesn't even start with a valid
/// value token, report the offending byte the way `encoding/json` does
/// ("invalid character 'i' looking for beginning of value"), per §8's
/// concrete scenario 2. Deeper structural errors fall back to serde's
/// own message, which this pipeline doesn't promise verbatim.
fn describe_json_error(raw: &[u8], e: &serde_json::Error) -> String {
    if e.classify() == serde_json::error::Category::Syntax {
        if let Some(&byte) = raw.iter().find(|b| !b.is_ascii_whitespace()) {
            if !matches!(byte, b'{' | b'[' | b'"' | b'-' | b'0'..=b'9' | b't' | b'f' | b'n') {
                return format!("invalid character {:?} looking for beginning of value", byte as char);
            }
        }
    }
    e.to_string()
}

/// Decode `filter`/`fields`/`sort`/`limit`/`page`/`skip`/`total` from a
/// URL query string map, per §4.6 step 2 and §6.
pub fn decode_query_params(
    params: &HashMap<String, String>,
    schema: &Schema,
    default_limit: u32,
    max_limit: u32,
) -> Result<(Query, bool)> {
    let mut query = Query::new();

    if let Some(raw) = params.get("filter") {
        let value: Value = serde_json::from_str(raw)
            .map_err(|_| url_params_error())?;
        query.predicate = parse_filter(&value, schema).map_err(|_| url_params_error())?;
    }

    if let Some(raw) = params.get("fields") {
        query.projection = Some(parse_projection(raw, schema).map_err(|_| url_params_error())?);
    }

    if let Some(raw) = params.get("sort") {
        query.sort = parse_sort(raw, schema).map_err(|_| url_params_error())?;
    }

    let limit = match params.get("limit") {
        Some(raw) => Some(raw.parse::<u32>().map_err(|_| url_params_error())?),
        None => Some(default_limit),
    };
    if let Some(limit) = limit {
        if limit > max_limit {
            return Err(url_params_error());
        }
    }

    let skip = match params.get("skip") {
        Some(raw) => raw.parse::<u32>().map_err(|_| url_params_error())?,
        None => 0,
    };
    let page = match params.get("page") {
        Some(raw) => raw.parse::<u32>().map_err(|_| url_params_error())?,
        None => 1,
    };
    if page < 1 {
        return Err(url_params_error());
    }
    let offset = skip + limit.unwrap_or(default_limit) * (page - 1);

    query.window = Window { limit, offset };

    let total_requested = match params.get("total") {
        Some(raw) => match raw.as_str() {
            "0" => false,
            "1" => true,
            _ => return Err(url_params_error()),
        },
        None => false,
    };

    Ok((query, total_requested))
}

fn url_params_error() -> Error {
    Error::unprocessable("URL parameters contain error(s)", Default::default())
}

/// Merge the path's constraint values (parent-link fields) into a
/// predicate, per §4.6 step 3.
pub fn intersect_with_path(query: &mut Query, path: &ResourcePath<'_>) {
    for (field, value) in path.values() {
        query.predicate.push(crate::query::Expr::Equal {
            field,
            value: value.to_value(),
        });
    }
}

/// Force-set the parent-link field in a create/replace/update payload to
/// the path's value when the client omits it. An explicit, schema-valid
/// value the client supplies is left as-is, even if it names a
/// different parent than the URL (§4.6's "Sub-resource create/replace
/// propagation"; see DESIGN.md's Open Question decision on this point).
pub fn apply_parent_link(payload: &mut Value, path: &ResourcePath<'_>) -> Result<()> {
    let Some(last) = path.components.last() else { return Ok(()) };
    // The parent link belongs to the *target* resource, not a path
    // component; this is only relevant when `path.target` itself has a
    // `parent_field_name` matching the deepest path component's field.
    let Some(parent_field) = &path.target.parent_field_name else { return Ok(()) };
    let Some(obj) = payload.as_object_mut() else { return Ok(()) };

    if !obj.contains_key(parent_field) {
        obj.insert(parent_field.clone(), last.value.to_value());
    }
    Ok(())
}

/// The immutable-id invariant: a decoded body must not change `id`.
/// A parent-link field is exempt — an explicit, schema-valid override is
/// honored rather than rejected (§8.5; `apply_parent_link` applies the
/// matching "force-set only when absent" rule on create/replace).
pub fn check_immutable_id(payload: &Value, original: &Item, _path: &ResourcePath<'_>) -> Result<()> {
    if let Some(id_value) = payload.get("id") {
        if let Some(decoded_id) = ItemId::from_value(id_value) {
            if decoded_id != original.id {
                return Err(Error::unprocessable_field(
                    "Cannot change document ID",
                    "id",
                    "id in body does not match the URL".to_string(),
                ));
            }
        }
    }
    Ok(())
}

/// Evaluate `If-Match`/`If-Unmodified-Since`/`If-None-Match` against the
/// current item, per §4.6's "Optimistic concurrency".
pub fn check_preconditions(headers: &RequestHeaders, current: Option<&Item>) -> Result<()> {
    if let Some(if_match) = &headers.if_match {
        let current = current.ok_or_else(|| Error::PreconditionFailed)?;
        if !current.etag.matches_header_value(if_match) {
            return Err(Error::PreconditionFailed);
        }
    }

    if let Some(raw) = &headers.if_unmodified_since {
        let since = DateTime::parse_from_rfc2822(raw)
            .map_err(|_| Error::BadRequest("Invalid If-Unmodified-Since header".into()))?
            .with_timezone(&Utc);
        let current = current.ok_or_else(|| Error::PreconditionFailed)?;
        if truncate_to_second(current.updated) > truncate_to_second(since) {
            return Err(Error::PreconditionFailed);
        }
    }

    if headers.if_none_match.as_deref() == Some("*") && current.is_some() {
        return Err(Error::PreconditionFailed);
    }

    Ok(())
}

/// Drop sub-second precision, per §4.6 ("`Item.Updated` truncated to
/// second resolution").
fn truncate_to_second(dt: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(dt.timestamp(), 0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_decode_query_params_defaults() {
        let schema = Schema::new();
        let (query, total_requested) = decode_query_params(&HashMap::new(), &schema, 20, 1000).unwrap();
        assert_eq!(query.window.limit, Some(20));
        assert_eq!(query.window.offset, 0);
        assert!(!total_requested);
    }

    #[test]
    fn test_decode_query_params_rejects_limit_over_max() {
        let schema = Schema::new();
        let mut params = HashMap::new();
        params.insert("limit".to_string(), "5000".to_string());
        assert!(decode_query_params(&params, &schema, 20, 1000).is_err());
    }

    #[test]
    fn test_check_immutable_id_rejects_mismatch() {
        let original = Item::new(ItemId::String("2".into()), json!({"id": "2"}));
        let path = crate::router::ResourcePath {
            components: vec![],
            target: leak_resource(),
            item_id: Some(ItemId::String("2".into())),
        };
        let payload = json!({"id": "3"});
        assert!(check_immutable_id(&payload, &original, &path).is_err());
    }

    fn leak_resource() -> &'static crate::resource::Resource {
        Box::leak(Box::new(crate::resource::Resource::without_storer("foo", Schema::new())))
    }
}
