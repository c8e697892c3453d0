//! HTTP-level pipeline tests: drive the real axum `Router` built by
//! `resthive_server::build_router` with `tower::ServiceExt::oneshot`,
//! instead of calling `resthive_core::handlers` directly.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use resthive_auth::JwtConfig;
use resthive_core::resource::Resource;
use resthive_core::schema::{Field, Schema, Validator};
use resthive_core::{AppConfig, Index};
use resthive_mem::MemStorer;
use resthive_server::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

fn generate_id(_client_value: Option<&Value>) -> Value {
    json!(Uuid::new_v4().to_string())
}

fn users_schema() -> Schema {
    Schema::new()
        .field(Field::new("id", Validator::string()).read_only().with_on_init(Arc::new(generate_id)))
        .field(Field::new("name", Validator::string()).required())
        .field(Field::new("email", Validator::string()).required())
}

fn posts_schema() -> Schema {
    Schema::new()
        .field(Field::new("id", Validator::string()).read_only().with_on_init(Arc::new(generate_id)))
        .field(Field::new("user_id", Validator::reference("users")).required())
        .field(Field::new("title", Validator::string()).required())
}

fn test_router() -> axum::Router {
    let posts = Resource::new("posts", posts_schema(), Arc::new(MemStorer::new())).as_child_of("user_id");
    let users = Resource::new("users", users_schema(), Arc::new(MemStorer::new())).with_child(posts);
    let index = Index::new().with_resource(users);
    index.bind().expect("demo tree must bind");

    let jwt_config = JwtConfig { anon_role: Some("anon".to_string()), ..Default::default() };
    let state = Arc::new(AppState::new(index, AppConfig::default(), jwt_config));
    build_router(state)
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = match body {
        Some(v) => Body::from(serde_json::to_vec(&v).unwrap()),
        None => Body::empty(),
    };
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: Value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

#[tokio::test]
async fn health_and_ready_are_reachable_without_auth() {
    let app = test_router();

    let request = Request::builder().method("GET").uri("/health").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder().method("GET").uri("/ready").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_then_read_a_user_round_trips() {
    let app = test_router();

    let (status, created) =
        send(&app, "POST", "/users", Some(json!({"name": "Ada", "email": "ada@example.com"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["name"], json!("Ada"));

    let (status, fetched) = send(&app, "GET", &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["email"], json!("ada@example.com"));
}

#[tokio::test]
async fn list_users_returns_a_json_array() {
    let app = test_router();
    send(&app, "POST", "/users", Some(json!({"name": "Ada", "email": "ada@example.com"}))).await;
    send(&app, "POST", "/users", Some(json!({"name": "Grace", "email": "grace@example.com"}))).await;

    let (status, body) = send(&app, "GET", "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn sub_resource_list_is_constrained_to_its_parent() {
    let app = test_router();
    let (_, user_a) = send(&app, "POST", "/users", Some(json!({"name": "A", "email": "a@example.com"}))).await;
    let (_, user_b) = send(&app, "POST", "/users", Some(json!({"name": "B", "email": "b@example.com"}))).await;
    let id_a = user_a["id"].as_str().unwrap();
    let id_b = user_b["id"].as_str().unwrap();

    send(&app, "POST", &format!("/users/{id_a}/posts"), Some(json!({"title": "a-post"}))).await;
    send(&app, "POST", &format!("/users/{id_b}/posts"), Some(json!({"title": "b-post"}))).await;

    let (status, body) = send(&app, "GET", &format!("/users/{id_a}/posts"), None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], json!("a-post"));
}

#[tokio::test]
async fn delete_then_read_is_not_found() {
    let app = test_router();
    let (_, created) = send(&app, "POST", "/users", Some(json!({"name": "A", "email": "a@example.com"}))).await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, "DELETE", &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn creating_a_user_without_required_fields_is_unprocessable() {
    let app = test_router();
    let (status, body) = send(&app, "POST", "/users", Some(json!({"name": "A"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["issues"].as_object().unwrap().contains_key("email"));
}

#[tokio::test]
async fn unknown_resource_segment_is_not_found() {
    let app = test_router();
    let (status, _) = send(&app, "GET", "/widgets", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn openapi_document_is_served_under_admin() {
    let app = test_router();
    let (status, body) = send(&app, "GET", "/admin/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/users").is_some());
}
