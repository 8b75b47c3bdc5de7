//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `TEMPOLINK_DB_PATH`: Database file path
//! - `TEMPOLINK_DB_POOL_SIZE`: Connection pool size (optional)
//! - `TEMPOLINK_OAUTH_CLIENT_ID`: OAuth application (client) id
//! - `TEMPOLINK_OAUTH_REDIRECT_URI`: Redirect URI used by the front end (optional)
//! - `TEMPOLINK_OAUTH_SCOPE`: Delegated scopes (optional)
//! - `TEMPOLINK_OAUTH_TOKEN_ENDPOINT`: Token endpoint override (optional)
//! - `TEMPOLINK_BIND_ADDR`: Webhook server bind address (optional)
//! - `TEMPOLINK_PUBLIC_BASE_URL`: Externally reachable base URL (optional)
//!
//! ## File Locations
//! The loader probes `config.{json,toml}` and `tempolink.{json,toml}` in the
//! working directory, its parents (up to 2 levels), and next to the
//! executable.

use std::path::{Path, PathBuf};

use tempolink_domain::{
    Config, DatabaseConfig, OAuthSettings, Result, ServerConfig, TempoLinkError,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If required variables
/// are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `TempoLinkError::Config` if configuration cannot be loaded from
/// either source.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// `TEMPOLINK_DB_PATH` and `TEMPOLINK_OAUTH_CLIENT_ID` are required; the
/// remaining variables fall back to defaults.
///
/// # Errors
/// Returns `TempoLinkError::Config` if required variables are missing or
/// have invalid values.
pub fn load_from_env() -> Result<Config> {
    let db_path = env_var("TEMPOLINK_DB_PATH")?;
    let client_id = env_var("TEMPOLINK_OAUTH_CLIENT_ID")?;

    let defaults = Config::default();

    let pool_size = match std::env::var("TEMPOLINK_DB_POOL_SIZE") {
        Ok(raw) => raw
            .parse::<u32>()
            .map_err(|e| TempoLinkError::Config(format!("Invalid pool size: {e}")))?,
        Err(_) => defaults.database.pool_size,
    };

    Ok(Config {
        database: DatabaseConfig { path: db_path, pool_size },
        oauth: OAuthSettings {
            client_id,
            redirect_uri: env_or("TEMPOLINK_OAUTH_REDIRECT_URI", defaults.oauth.redirect_uri),
            scope: env_or("TEMPOLINK_OAUTH_SCOPE", defaults.oauth.scope),
            token_endpoint: env_or(
                "TEMPOLINK_OAUTH_TOKEN_ENDPOINT",
                defaults.oauth.token_endpoint,
            ),
        },
        server: ServerConfig {
            bind_addr: env_or("TEMPOLINK_BIND_ADDR", defaults.server.bind_addr),
            public_base_url: env_or(
                "TEMPOLINK_PUBLIC_BASE_URL",
                defaults.server.public_base_url,
            ),
        },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `TempoLinkError::Config` if the file is missing or malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(TempoLinkError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            TempoLinkError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| TempoLinkError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, detecting the format from the
/// file extension.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| TempoLinkError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| TempoLinkError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(TempoLinkError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe standard locations for configuration files, returning the first
/// that exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("tempolink.json"),
            cwd.join("tempolink.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
            cwd.join("../../config.json"),
            cwd.join("../../config.toml"),
        ]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("tempolink.json"),
                exe_dir.join("tempolink.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        TempoLinkError::Config(format!("Missing required environment variable: {key}"))
    })
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}
