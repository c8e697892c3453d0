//! `Create`: `POST /collection` (§4.6).

use super::common::{apply_parent_link, decode_body, RequestHeaders};
use super::Outcome;
use crate::error::Error;
use crate::index::Index;
use crate::item::{Item, ItemId};
use crate::resource::Mode;
use crate::response::{item_headers, shape_item};
use crate::router::ResourcePath;
use chrono::Utc;

pub async fn handle(
    index: &Index,
    path: &ResourcePath<'_>,
    headers: &RequestHeaders,
    raw_body: &[u8],
) -> crate::error::Result<Outcome> {
    let resource = path.target;
    if !resource.allows(Mode::Create) {
        return Err(Error::MethodNotAllowed);
    }

    resource.hooks.authorize(path, Mode::Create).await?;

    let mut payload = decode_body(raw_body)?;
    apply_parent_link(&mut payload, path)?;

    let prepared = resource.schema.prepare(&payload, None, true)?;
    let validated = resource.schema.validate(&prepared, index)?;

    let id = validated
        .get("id")
        .and_then(ItemId::from_value)
        .ok_or_else(|| Error::unprocessable_field("Document contains error(s)", "id", "id is required".to_string()))?;

    if headers.if_none_match.as_deref() == Some("*") {
        let mut probe = crate::query::Query::new();
        probe.predicate.push(crate::query::Expr::Equal { field: "id".to_string(), value: id.to_value() });
        let existing = resource.storer.find(&probe).await?;
        if !existing.items.is_empty() {
            return Err(Error::PreconditionFailed);
        }
    }

    let mut item = Item::new(id, validated);
    resource.hooks.on_insert(&mut item).await?;

    let inserted = resource.storer.insert(item).await?;
    resource.hooks.on_inserted(&inserted).await?;

    let location = format!("/{}/{}", resource.name, inserted.id);
    let body = shape_item(index, &resource.schema, None, &inserted.payload).await?;

    if headers.prefer_return_minimal {
        return Ok(Outcome {
            status: 204,
            headers: item_headers(&inserted, Utc::now(), Some(&location)),
            body: None,
        });
    }

    Ok(Outcome {
        status: 201,
        headers: item_headers(&inserted, Utc::now(), Some(&location)),
        body: Some(body),
    })
}
