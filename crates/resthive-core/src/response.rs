//! C7 — Response shaping: projection evaluation, reference embedding,
//! ETag/header computation, per §4.7. Folds in what the teacher split
//! into its own `postrust-response` crate (see DESIGN.md) — here it's
//! part of the core the way §2's component table places it.

use crate::error::Result;
use crate::index::Index;
use crate::item::{Item, ItemId};
use crate::query::{apply_projection, Expr, Projection, ProjectionField, Query};
use crate::resource::Resource;
use crate::schema::{Schema, Validator};
use chrono::{DateTime, Utc};
use http::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

/// Render an `ETag` as a header value, weak form (§4.7).
pub fn etag_header(item: &Item) -> HeaderValue {
    HeaderValue::from_str(&item.etag.weak()).expect("etag is ascii")
}

/// Render a timestamp as `Last-Modified`, RFC 1123.
pub fn last_modified_header(updated: DateTime<Utc>) -> HeaderValue {
    HeaderValue::from_str(&format_rfc1123(updated)).expect("rfc1123 date is ascii")
}

/// Render the current server time as `Date`, RFC 1123.
pub fn date_header(now: DateTime<Utc>) -> HeaderValue {
    HeaderValue::from_str(&format_rfc1123(now)).expect("rfc1123 date is ascii")
}

fn format_rfc1123(dt: DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// `X-Total`, present whenever a count is actually available — either
/// because the client asked for one (`total=1`) and the storer produced
/// it, or because the storer always reports an exact total (§4.7).
pub fn total_header(total: i64) -> Option<HeaderValue> {
    if total >= 0 {
        HeaderValue::from_str(&total.to_string()).ok()
    } else {
        None
    }
}

/// The default projection for a schema: every non-hidden field, no
/// sub-selection or embeds.
pub fn default_projection(schema: &Schema) -> Projection {
    schema
        .fields()
        .filter(|(_, field)| !field.hidden)
        .map(|(name, _)| ProjectionField::new(name.clone()))
        .collect()
}

/// Project a single item's payload and resolve any reference embeds
/// against `index`, per §4.7's "Reference embedding".
pub async fn shape_item(
    index: &Index,
    schema: &Schema,
    projection: Option<&Projection>,
    payload: &Value,
) -> Result<Value> {
    let owned;
    let proj = match projection {
        Some(p) => p,
        None => {
            owned = default_projection(schema);
            &owned
        }
    };

    let mut shaped = apply_projection(proj, payload);
    embed_references(index, schema, proj, payload, &mut shaped).await?;
    Ok(shaped)
}

/// Recurse through the projection, resolving `{embed}` clauses for
/// `Reference` fields by issuing a `Find` against the target resource.
async fn embed_references(
    index: &Index,
    schema: &Schema,
    projection: &Projection,
    source: &Value,
    shaped: &mut Value,
) -> Result<()> {
    for field in projection {
        let Some(embed_proj) = &field.embed else { continue };
        let Some(schema_field) = schema.get(&field.name) else { continue };

        let Validator::Reference { target } = &schema_field.validator else {
            continue;
        };
        let Some(target_resource) = index.get_path(&target.0) else {
            continue;
        };
        let Some(ref_value) = source.as_object().and_then(|o| o.get(&field.name)) else {
            continue;
        };
        let Some(ref_id) = ItemId::from_value(ref_value) else {
            continue;
        };

        let embedded = fetch_and_project(target_resource, embed_proj, &ref_id).await?;
        if let Some(map) = shaped.as_object_mut() {
            map.insert(field.output_name().to_string(), embedded.unwrap_or(Value::Null));
        }
    }
    Ok(())
}

async fn fetch_and_project(
    target_resource: &Resource,
    embed_proj: &Projection,
    ref_id: &ItemId,
) -> Result<Option<Value>> {
    let mut query = Query::new();
    query.predicate.push(Expr::Equal {
        field: "id".to_string(),
        value: ref_id.to_value(),
    });
    let page = target_resource.storer.find(&query).await?;
    match page.items.first() {
        Some(item) => Ok(Some(apply_projection(embed_proj, &item.payload))),
        None => Ok(None),
    }
}

/// Assemble the full header set for a single-item response.
pub fn item_headers(item: &Item, now: DateTime<Utc>, location: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(http::header::ETAG, etag_header(item));
    headers.insert(http::header::LAST_MODIFIED, last_modified_header(item.updated));
    headers.insert(http::header::DATE, date_header(now));
    headers.insert(http::header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(loc) = location {
        if let Ok(v) = HeaderValue::from_str(loc) {
            headers.insert(http::header::LOCATION, v);
        }
    }
    headers
}

/// Assemble headers for a list response.
pub fn list_headers(now: DateTime<Utc>, total: i64) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(http::header::DATE, date_header(now));
    headers.insert(http::header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(total_value) = total_header(total) {
        headers.insert(HeaderName::from_static("x-total"), total_value);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_last_modified_format() {
        let dt = DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z").unwrap().with_timezone(&Utc);
        let header = last_modified_header(dt);
        assert_eq!(header.to_str().unwrap(), "Tue, 02 Jan 2024 03:04:05 GMT");
    }

    #[test]
    fn test_default_projection_skips_hidden() {
        let schema = Schema::new()
            .field(Field::new("id", Validator::string()))
            .field(Field::new("secret", Validator::string()).hidden());
        let proj = default_projection(&schema);
        assert_eq!(proj.len(), 1);
        assert_eq!(proj[0].name, "id");
    }

    #[tokio::test]
    async fn test_shape_item_applies_projection_idempotently() {
        let schema = Schema::new().field(Field::new("id", Validator::string()));
        let index = Index::new();
        let payload = json!({"id": "1", "extra": "dropped"});
        let once = shape_item(&index, &schema, None, &payload).await.unwrap();
        let twice = shape_item(&index, &schema, None, &once).await.unwrap();
        assert_eq!(once, json!({"id": "1"}));
        assert_eq!(once, twice);
    }
}
