//! Application state.

use resthive_auth::JwtConfig;
use resthive_core::{AppConfig, Index};
use std::sync::Arc;

/// Shared application state: the bound resource tree and the ambient
/// server configuration every request needs.
pub struct AppState {
    /// The bound resource tree requests are dispatched against.
    pub index: Arc<Index>,
    /// Application configuration (bind address, pagination defaults).
    pub config: AppConfig,
    /// JWT configuration for the reference `Authorize` hook.
    pub jwt_config: JwtConfig,
}

impl AppState {
    pub fn new(index: Index, config: AppConfig, jwt_config: JwtConfig) -> Self {
        Self { index: Arc::new(index), config, jwt_config }
    }
}
