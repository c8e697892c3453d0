//! `Update`: `PATCH /collection/{id}` (§4.6). Body is either a merge
//! object (`Content-Type: application/json`) or an RFC 6902 patch
//! document (`Content-Type: application/json-patch+json`).

use super::common::{apply_parent_link, check_immutable_id, check_preconditions, decode_body, RequestHeaders};
use super::Outcome;
use crate::error::Error;
use crate::index::Index;
use crate::json_patch;
use crate::query::Expr;
use crate::resource::Mode;
use crate::response::{item_headers, shape_item};
use crate::router::ResourcePath;
use chrono::Utc;

const JSON_PATCH_CONTENT_TYPE: &str = "application/json-patch+json";

pub async fn handle(
    index: &Index,
    path: &ResourcePath<'_>,
    headers: &RequestHeaders,
    raw_body: &[u8],
) -> crate::error::Result<Outcome> {
    let resource = path.target;
    if !resource.allows(Mode::Update) {
        return Err(Error::MethodNotAllowed);
    }
    let Some(id) = &path.item_id else {
        return Err(Error::NotFound("missing item id".into()));
    };

    resource.hooks.authorize(path, Mode::Update).await?;

    let mut probe = crate::query::Query::new();
    probe.predicate.push(Expr::Equal { field: "id".to_string(), value: id.to_value() });
    let page = resource.storer.find(&probe).await?;
    let original = page.items.into_iter().next().ok_or_else(|| Error::NotFound(format!("no item with id {}", id)))?;

    check_preconditions(headers, Some(&original))?;

    let is_json_patch = headers.content_type.as_deref() == Some(JSON_PATCH_CONTENT_TYPE);
    let body = decode_body(raw_body)?;

    let candidate = if is_json_patch {
        let ops = json_patch::decode(&body)?;
        let mut target = original.payload.clone();
        json_patch::apply(&mut target, &ops)?;
        target
    } else {
        let mut payload = body;
        apply_parent_link(&mut payload, path)?;
        resource.schema.prepare(&payload, Some(&original.payload), false)?
    };

    check_immutable_id(&candidate, &original, path)?;
    let validated = resource.schema.validate(&candidate, index)?;

    let mut item = original.clone().with_payload(validated);
    resource.hooks.on_update(&mut item, &original).await?;

    let updated = resource.storer.update(item, &original).await?;
    resource.hooks.on_updated(&updated).await?;

    let body = shape_item(index, &resource.schema, None, &updated.payload).await?;

    if headers.prefer_return_minimal {
        return Ok(Outcome {
            status: 204,
            headers: item_headers(&updated, Utc::now(), None),
            body: None,
        });
    }

    Ok(Outcome {
        status: 200,
        headers: item_headers(&updated, Utc::now(), None),
        body: Some(body),
    })
}
