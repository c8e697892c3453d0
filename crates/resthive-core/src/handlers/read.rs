//! `Read`: `GET /collection/{id}` (§4.6).

use super::common::{decode_query_params, intersect_with_path};
use super::Outcome;
use crate::error::Error;
use crate::index::Index;
use crate::query::Expr;
use crate::resource::Mode;
use crate::response::{item_headers, shape_item};
use crate::router::ResourcePath;
use chrono::Utc;
use std::collections::HashMap;

pub async fn handle(
    index: &Index,
    path: &ResourcePath<'_>,
    params: &HashMap<String, String>,
) -> crate::error::Result<Outcome> {
    let resource = path.target;
    if !resource.allows(Mode::Read) {
        return Err(Error::MethodNotAllowed);
    }
    let Some(id) = &path.item_id else {
        return Err(Error::NotFound("missing item id".into()));
    };

    let (mut query, _total_requested) =
        decode_query_params(params, &resource.schema, resource.conf.default_limit, resource.conf.max_limit)?;
    intersect_with_path(&mut query, path);
    query.predicate.push(Expr::Equal { field: "id".to_string(), value: id.to_value() });

    resource.hooks.authorize(path, Mode::Read).await?;
    resource.hooks.on_found(path).await?;

    let page = resource.storer.find(&query).await?;
    let Some(mut item) = page.items.into_iter().next() else {
        return Err(Error::NotFound(format!("no item with id {}", id)));
    };
    resource.hooks.on_got(&mut item).await?;

    let body = shape_item(index, &resource.schema, query.projection.as_ref(), &item.payload).await?;

    Ok(Outcome {
        status: 200,
        headers: item_headers(&item, Utc::now(), None),
        body: Some(body),
    })
}
