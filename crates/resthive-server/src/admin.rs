//! Admin/documentation endpoints:
//! - `/admin` — a small dashboard listing bound resources
//! - `/admin/openapi.json` — the OpenAPI 3.0 document, generated at
//!   startup by walking the bound `Index`
//! - `/admin/swagger` — Swagger UI pointed at `/admin/openapi.json`

use axum::{
    extract::State,
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use resthive_openapi::DocumentInfo;
use std::sync::Arc;

use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin", get(dashboard_handler))
        .route("/admin/openapi.json", get(openapi_json_handler))
        .route("/admin/swagger", get(swagger_ui_handler))
        .route("/admin/swagger/", get(swagger_ui_handler))
}

async fn dashboard_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let resource_count = state.index.resources().len();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>resthive admin</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
                background: #0d1117; color: #c9d1d9; margin: 0; padding: 2rem; }}
        .container {{ max-width: 640px; margin: 0 auto; }}
        h1 {{ color: #58a6ff; }}
        .stat {{ font-size: 2rem; font-weight: bold; }}
        a {{ color: #58a6ff; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>resthive</h1>
        <p class="stat">{resource_count}</p>
        <p>top-level resource(s) bound</p>
        <ul>
            <li><a href="/admin/openapi.json">OpenAPI document</a></li>
            <li><a href="/admin/swagger">Swagger UI</a></li>
        </ul>
    </div>
</body>
</html>"#
    ))
}

async fn openapi_json_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let info = DocumentInfo::new("resthive API", env!("CARGO_PKG_VERSION"))
        .with_description("REST API generated from a resthive resource tree");
    Json(resthive_openapi::build_document(&state.index, info))
}

async fn swagger_ui_handler() -> impl IntoResponse {
    Html(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>resthive API - Swagger UI</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        html { box-sizing: border-box; overflow-y: scroll; }
        *, *:before, *:after { box-sizing: inherit; }
        body { margin: 0; background: #fafafa; }
        .swagger-ui .topbar { display: none; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = function() {
            SwaggerUIBundle({
                url: "/admin/openapi.json",
                dom_id: '#swagger-ui',
                deepLinking: true,
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout"
            });
        };
    </script>
</body>
</html>"#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use resthive_core::resource::Resource;
    use resthive_core::schema::{Field, Schema, Validator};
    use resthive_core::storer::NoStorer;
    use resthive_core::Index;
    use std::sync::Arc;

    fn sample_state() -> Arc<AppState> {
        let users = Resource::new(
            "users",
            Schema::new().field(Field::new("id", Validator::string()).read_only()),
            Arc::new(NoStorer),
        );
        let index = Index::new().with_resource(users);
        Arc::new(AppState::new(
            index,
            resthive_core::AppConfig::default(),
            resthive_auth::JwtConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_openapi_json_handler_includes_bound_resource() {
        let state = sample_state();
        let response = openapi_json_handler(State(state)).await.into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(doc["paths"].get("/users").is_some());
    }

    #[tokio::test]
    async fn test_dashboard_handler_reports_resource_count() {
        let state = sample_state();
        let response = dashboard_handler(State(state)).await.into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains(">1<"));
    }
}
