//! Ambient configuration for a pipeline deployment.
//!
//! The Index/Resource tree itself is built in code by the host application
//! (§4.4: "created during bind, immutable thereafter"), not read from the
//! environment. `AppConfig` covers the surrounding server concerns: bind
//! address, pagination defaults/limits, and the settings an optional
//! `Authorize` hook (e.g. `resthive-auth`) needs.

use serde::{Deserialize, Serialize};

/// Ambient pipeline/server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server host to bind.
    #[serde(default = "default_host")]
    pub server_host: String,

    /// Server port to bind.
    #[serde(default = "default_port")]
    pub server_port: u16,

    /// Default page size (`limit`) when the client omits one.
    #[serde(default = "default_page_size")]
    pub default_limit: u32,

    /// Hard cap on `limit`; requests above this are rejected per §4.6
    /// ("`limit ≤ maxLimit`").
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,

    /// JWT secret for the reference `Authorize` hook.
    pub jwt_secret: Option<String>,

    /// JWT secret is base64-encoded.
    #[serde(default)]
    pub jwt_secret_is_base64: bool,

    /// Role claim key inside the JWT payload.
    #[serde(default = "default_role_claim")]
    pub jwt_role_claim_key: String,

    /// Role assumed for unauthenticated requests, if any.
    pub anon_role: Option<String>,

    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: default_host(),
            server_port: default_port(),
            default_limit: default_page_size(),
            max_limit: default_max_limit(),
            jwt_secret: None,
            jwt_secret_is_base64: false,
            jwt_role_claim_key: default_role_claim(),
            anon_role: None,
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("RESTHIVE_SERVER_HOST") {
            config.server_host = host;
        }
        if let Ok(port) = std::env::var("RESTHIVE_SERVER_PORT") {
            if let Ok(p) = port.parse() {
                config.server_port = p;
            }
        }
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(p) = port.parse() {
                config.server_port = p;
            }
        }
        if let Ok(limit) = std::env::var("RESTHIVE_DEFAULT_LIMIT") {
            if let Ok(n) = limit.parse() {
                config.default_limit = n;
            }
        }
        if let Ok(limit) = std::env::var("RESTHIVE_MAX_LIMIT") {
            if let Ok(n) = limit.parse() {
                config.max_limit = n;
            }
        }
        if let Ok(secret) = std::env::var("RESTHIVE_JWT_SECRET") {
            config.jwt_secret = Some(secret);
        }
        if let Ok(role) = std::env::var("RESTHIVE_ANON_ROLE") {
            config.anon_role = Some(role);
        }

        config
    }
}

/// Log levels, mapped onto `tracing::Level` by the server binary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_tracing(&self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_page_size() -> u32 {
    20
}

fn default_max_limit() -> u32 {
    1000
}

fn default_role_claim() -> String {
    "role".to_string()
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.default_limit, 20);
        assert_eq!(config.max_limit, 1000);
    }

    #[test]
    fn test_log_level_to_tracing() {
        assert_eq!(LogLevel::Debug.to_tracing(), tracing::Level::DEBUG);
        assert_eq!(LogLevel::Error.to_tracing(), tracing::Level::ERROR);
    }
}
