//! Health and readiness routes, outside the resource-tree pipeline.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Ready once the resource tree has at least one bound resource; a
/// pipeline with no resources has nothing useful to serve.
async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let resource_count = state.index.resources().len();
    if resource_count > 0 {
        (StatusCode::OK, Json(ReadinessResponse { ready: true, resources: resource_count, message: None }))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse { ready: false, resources: 0, message: Some("no resources bound".to_string()) }),
        )
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Serialize)]
struct ReadinessResponse {
    ready: bool,
    resources: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}
