//! C6 — Method handlers: a small ordered state machine per HTTP method,
//! per §4.6. Each mode lives in its own module the way the teacher
//! splits request stages (`api_request/`) and plan stages (`plan/`) into
//! focused files.

mod clear;
mod common;
mod create;
mod delete;
mod list;
mod read;
mod replace;
mod update;

pub use common::{decode_query_params, RequestHeaders};

use crate::index::Index;
use crate::router::ResourcePath;
use http::HeaderMap;
use serde_json::Value;
use std::collections::HashMap;

/// The result of dispatching a request to a handler: status, headers,
/// and an optional JSON body.
#[derive(Debug)]
pub struct Outcome {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

/// Dispatch a `GET` on a collection.
pub async fn list(index: &Index, path: &ResourcePath<'_>, params: &HashMap<String, String>) -> crate::error::Result<Outcome> {
    list::handle(index, path, params).await
}

/// Dispatch a `GET` on an item.
pub async fn read(index: &Index, path: &ResourcePath<'_>, params: &HashMap<String, String>) -> crate::error::Result<Outcome> {
    read::handle(index, path, params).await
}

/// Dispatch a `POST` on a collection.
pub async fn create(
    index: &Index,
    path: &ResourcePath<'_>,
    headers: &RequestHeaders,
    raw_body: &[u8],
) -> crate::error::Result<Outcome> {
    create::handle(index, path, headers, raw_body).await
}

/// Dispatch a `PUT` on an item.
pub async fn replace(
    index: &Index,
    path: &ResourcePath<'_>,
    headers: &RequestHeaders,
    raw_body: &[u8],
) -> crate::error::Result<Outcome> {
    replace::handle(index, path, headers, raw_body).await
}

/// Dispatch a `PATCH` on an item.
pub async fn update(
    index: &Index,
    path: &ResourcePath<'_>,
    headers: &RequestHeaders,
    raw_body: &[u8],
) -> crate::error::Result<Outcome> {
    update::handle(index, path, headers, raw_body).await
}

/// Dispatch a `DELETE` on an item.
pub async fn delete(path: &ResourcePath<'_>, headers: &RequestHeaders) -> crate::error::Result<Outcome> {
    delete::handle(path, headers).await
}

/// Dispatch a `DELETE` on a collection.
pub async fn clear(path: &ResourcePath<'_>, params: &HashMap<String, String>) -> crate::error::Result<Outcome> {
    clear::handle(path, params).await
}
