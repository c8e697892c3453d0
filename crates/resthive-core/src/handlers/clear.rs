//! `Clear`: `DELETE /collection` (§4.6).

use super::common::{decode_query_params, intersect_with_path};
use super::Outcome;
use crate::error::Error;
use crate::resource::Mode;
use crate::response::total_header;
use crate::router::ResourcePath;
use http::{HeaderMap, HeaderName};
use std::collections::HashMap;

pub async fn handle(
    path: &ResourcePath<'_>,
    params: &HashMap<String, String>,
) -> crate::error::Result<Outcome> {
    let resource = path.target;
    if !resource.allows(Mode::Clear) {
        return Err(Error::MethodNotAllowed);
    }

    let (mut query, _total_requested) =
        decode_query_params(params, &resource.schema, resource.conf.default_limit, resource.conf.max_limit)?;
    intersect_with_path(&mut query, path);

    resource.hooks.authorize(path, Mode::Clear).await?;
    resource.hooks.on_clear(&query).await?;

    let count = resource.storer.clear(&query).await?;
    resource.hooks.on_cleared(count).await?;

    let mut headers = HeaderMap::new();
    if let Some(total) = total_header(count) {
        headers.insert(HeaderName::from_static("x-total"), total);
    }

    Ok(Outcome {
        status: 204,
        headers,
        body: None,
    })
}
