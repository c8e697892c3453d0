//! `List`: `GET /collection` (§4.6).

use super::common::{decode_query_params, intersect_with_path};
use super::Outcome;
use crate::error::Error;
use crate::index::Index;
use crate::resource::Mode;
use crate::response::{list_headers, shape_item};
use crate::router::ResourcePath;
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;

pub async fn handle(
    index: &Index,
    path: &ResourcePath<'_>,
    params: &HashMap<String, String>,
) -> crate::error::Result<Outcome> {
    let resource = path.target;
    if !resource.allows(Mode::List) {
        return Err(Error::MethodNotAllowed);
    }

    let (mut query, total_requested) =
        decode_query_params(params, &resource.schema, resource.conf.default_limit, resource.conf.max_limit)?;
    intersect_with_path(&mut query, path);

    resource.hooks.authorize(path, Mode::List).await?;
    resource.hooks.on_found(path).await?;

    let mut page = resource.storer.find(&query).await?;
    resource.hooks.on_got_list(&mut page.items).await?;

    let mut items = Vec::with_capacity(page.items.len());
    for item in &page.items {
        items.push(shape_item(index, &resource.schema, query.projection.as_ref(), &item.payload).await?);
    }

    let total = if page.total >= 0 {
        page.total
    } else if total_requested {
        resource.storer.count(&query).await?.unwrap_or(-1)
    } else {
        -1
    };

    Ok(Outcome {
        status: 200,
        headers: list_headers(Utc::now(), total),
        body: Some(Value::Array(items)),
    })
}
