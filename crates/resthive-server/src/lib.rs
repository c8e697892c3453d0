//! resthive-server library.
//!
//! The axum HTTP binding that mounts the resthive pipeline over a
//! host-supplied `Index`.

pub mod admin;
pub mod app;
pub mod custom;
pub mod state;

pub use app::handle_request;
pub use state::AppState;

use axum::{http::Method, routing::any, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Assemble the full axum `Router` over a bound `AppState`: the
/// catch-all resource pipeline plus the `/admin` and `/health`/`/ready`
/// routes, wrapped in a permissive CORS layer. Shared by the `main`
/// binary and by HTTP-level tests that need the same wiring without a
/// running `TcpListener`.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", any(handle_request))
        .route("/{*path}", any(handle_request))
        .merge(admin::router())
        .merge(custom::router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                    Method::HEAD,
                ])
                .allow_headers(Any)
                .expose_headers(Any),
        )
        .with_state(state)
}
