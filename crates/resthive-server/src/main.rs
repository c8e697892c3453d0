//! resthive server binary.
//!
//! Builds a demo `Index` in code (the tree is assembled by the host
//! application, never read from configuration) and mounts it behind the
//! axum HTTP binding in `app`.

use anyhow::{Context, Result};
use resthive_auth::JwtConfig;
use resthive_core::resource::Resource;
use resthive_core::schema::{Field, Schema, Validator};
use resthive_core::{AppConfig, Index};
use resthive_mem::MemStorer;
use resthive_server::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("resthive={}", level_name(&config.log_level))),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resthive server");

    let index = build_index();
    index.bind().context("failed to bind resource tree")?;
    info!("Bound {} top-level resource(s)", index.resources().len());

    let jwt_config = JwtConfig {
        secret: config.jwt_secret.clone(),
        secret_is_base64: config.jwt_secret_is_base64,
        audience: None,
        role_claim_key: config.jwt_role_claim_key.clone(),
        anon_role: config.anon_role.clone(),
    };

    let state = Arc::new(AppState::new(index, config.clone(), jwt_config));
    let app = build_router(state);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn level_name(level: &resthive_core::config::LogLevel) -> &'static str {
    use resthive_core::config::LogLevel;
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

/// A demo resource tree: `users` and a `posts` sub-resource hanging off
/// each user, both backed by `resthive-mem`. Swap `MemStorer` for a
/// `resthive_sql::PgStorer` to run the same tree against Postgres.
fn build_index() -> Index {
    let users_schema = Schema::new()
        .field(Field::new("id", Validator::string()).read_only().with_on_init(Arc::new(generate_id)))
        .field(Field::new("name", Validator::string()).required())
        .field(Field::new("email", Validator::string()).required());

    let posts_schema = Schema::new()
        .field(Field::new("id", Validator::string()).read_only().with_on_init(Arc::new(generate_id)))
        .field(Field::new("user_id", Validator::reference("users")).required())
        .field(Field::new("title", Validator::string()).required())
        .field(Field::new("body", Validator::string()));

    let posts = Resource::new("posts", posts_schema, Arc::new(MemStorer::new())).as_child_of("user_id");

    let users = Resource::new("users", users_schema, Arc::new(MemStorer::new())).with_child(posts);

    Index::new().with_resource(users)
}

/// `id` producer for resources that don't take a client-supplied id.
fn generate_id(_client_value: Option<&Value>) -> Value {
    json!(Uuid::new_v4().to_string())
}
