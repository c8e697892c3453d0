//! `Delete`: `DELETE /collection/{id}` (§4.6).

use super::common::{check_preconditions, RequestHeaders};
use super::Outcome;
use crate::error::Error;
use crate::query::Expr;
use crate::resource::Mode;
use crate::router::ResourcePath;
use http::HeaderMap;

pub async fn handle(
    path: &ResourcePath<'_>,
    headers: &RequestHeaders,
) -> crate::error::Result<Outcome> {
    let resource = path.target;
    if !resource.allows(Mode::Delete) {
        return Err(Error::MethodNotAllowed);
    }
    let Some(id) = &path.item_id else {
        return Err(Error::NotFound("missing item id".into()));
    };

    resource.hooks.authorize(path, Mode::Delete).await?;

    let mut probe = crate::query::Query::new();
    probe.predicate.push(Expr::Equal { field: "id".to_string(), value: id.to_value() });
    let page = resource.storer.find(&probe).await?;
    let original = page.items.into_iter().next().ok_or_else(|| Error::NotFound(format!("no item with id {}", id)))?;

    check_preconditions(headers, Some(&original))?;

    resource.hooks.on_delete(&original).await?;
    resource.storer.delete(&original).await?;
    resource.hooks.on_deleted(&original).await?;

    Ok(Outcome {
        status: 204,
        headers: HeaderMap::new(),
        body: None,
    })
}
