//! Application configuration structures
//!
//! Configuration is loaded by `tempolink-infra` from environment variables
//! or a config file; these are the typed destinations. OAuth settings are an
//! explicit structure handed to clients at construction time — nothing reads
//! the process environment at call time.

use serde::{Deserialize, Serialize};

use crate::constants::{OAUTH_SCOPE, TOKEN_ENDPOINT};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub oauth: OAuthSettings,
    pub server: ServerConfig,
}

/// SQLite-backed user store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file path
    pub path: String,
    /// Connection pool size
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "tempolink.db".to_string(), pool_size: 5 }
    }
}

/// OAuth client settings for the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthSettings {
    /// Application (client) id registered with the identity provider
    pub client_id: String,
    /// Redirect URI the front end used during authorization
    pub redirect_uri: String,
    /// Space-separated delegated scopes
    pub scope: String,
    /// Token endpoint URL
    pub token_endpoint: String,
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            redirect_uri: "http://localhost:3000".to_string(),
            scope: OAUTH_SCOPE.to_string(),
            token_endpoint: TOKEN_ENDPOINT.to_string(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the webhook server binds to
    pub bind_addr: String,
    /// Externally reachable base URL, advertised in the manifest
    pub public_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            public_base_url: "http://localhost:8080".to_string(),
        }
    }
}
