//! Request handling: auth → route → dispatch → format → respond, the
//! same lifecycle shape as the teacher's `app.rs`, generalized from a
//! SQL-plan execution to a dispatch through `resthive_core::handlers`.

use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    response::{IntoResponse, Response},
};
use resthive_auth::{authenticate, context};
use resthive_core::handlers::{self, Outcome, RequestHeaders};
use resthive_core::router::route;
use resthive_core::Error;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Main request handler, mounted on every method/path by `main.rs`.
pub async fn handle_request(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    debug!("{} {}", method, path);

    let auth_header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let auth_result = match authenticate(auth_header.as_deref(), &state.jwt_config) {
        Ok(auth) => auth,
        Err(e) => {
            warn!("authentication failed: {}", e);
            return error_response(Error::NotFound("not found".into())).into_response();
        }
    };
    debug!("authenticated as role: {}", auth_result.role);

    let outcome = context::scope(auth_result, process_request(state, request)).await;
    match outcome {
        Ok(response) => response,
        Err(e) => error_response(e),
    }
}

async fn process_request(state: Arc<AppState>, request: Request) -> Result<Response, Error> {
    let (parts, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| Error::BadRequest(format!("failed to read request body: {}", e)))?;

    let segments: Vec<&str> = parts.uri.path().split('/').filter(|s| !s.is_empty()).collect();
    let resource_path = route(&state.index, &segments)?;

    let params = decode_query_string(parts.uri.query());
    let headers = decode_request_headers(&parts.headers);

    let outcome = match (parts.method.as_str(), &resource_path.item_id) {
        ("GET", Some(_)) => handlers::read(&state.index, &resource_path, &params).await?,
        ("GET", None) => handlers::list(&state.index, &resource_path, &params).await?,
        ("POST", None) => handlers::create(&state.index, &resource_path, &headers, &body_bytes).await?,
        ("PUT", Some(_)) => handlers::replace(&state.index, &resource_path, &headers, &body_bytes).await?,
        ("PATCH", Some(_)) => handlers::update(&state.index, &resource_path, &headers, &body_bytes).await?,
        ("DELETE", Some(_)) => handlers::delete(&resource_path, &headers).await?,
        ("DELETE", None) => handlers::clear(&resource_path, &params).await?,
        _ => return Err(Error::MethodNotAllowed),
    };

    Ok(build_response(outcome))
}

/// Decode `filter`/`fields`/`sort`/`limit`/`page`/`skip`/`total` straight
/// off the raw query string; repeated keys keep the last occurrence.
fn decode_query_string(query: Option<&str>) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.unwrap_or("").as_bytes())
        .into_owned()
        .collect()
}

fn decode_request_headers(headers: &http::HeaderMap) -> RequestHeaders {
    let get = |name: http::HeaderName| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);

    let prefer_return_minimal = headers
        .get(http::header::PREFER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(',').any(|part| part.trim() == "return=minimal"))
        .unwrap_or(false);

    RequestHeaders {
        content_type: get(http::header::CONTENT_TYPE),
        if_match: get(http::header::IF_MATCH),
        if_none_match: get(http::header::IF_NONE_MATCH),
        if_unmodified_since: get(http::header::IF_UNMODIFIED_SINCE),
        prefer_return_minimal,
    }
}

fn build_response(outcome: Outcome) -> Response {
    let status = http::StatusCode::from_u16(outcome.status).unwrap_or(http::StatusCode::OK);
    let mut builder = Response::builder().status(status);
    for (key, value) in outcome.headers.iter() {
        builder = builder.header(key, value);
    }

    let body = match outcome.body {
        Some(value) => Body::from(serde_json::to_vec(&value).unwrap_or_default()),
        None => Body::empty(),
    };

    builder.body(body).unwrap_or_else(|_| Response::new(Body::empty()))
}

fn error_response(error: Error) -> Response {
    if let Error::Internal(message) = &error {
        tracing::error!("internal error: {}", message);
    }

    let status = error.status_code();
    let body = serde_json::to_vec(&error.to_json()).unwrap_or_default();

    Response::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}
