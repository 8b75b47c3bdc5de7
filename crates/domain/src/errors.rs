//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for TempoLink
///
/// The variants mirror the failure taxonomy of the sync pipeline: terminal
/// per-invocation conditions (`UserNotFound`, `NotConnected`, `Validation`),
/// credential lifecycle failures (`TokenInvalid`, `Unauthorized`), lookup
/// misses (`EventNotFound`), and transient transport/provider failures that
/// the triggering caller owns retrying (`Network`, `Provider`).
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum TempoLinkError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Calendar provider not connected for user: {0}")]
    NotConnected(String),

    #[error("Refresh token invalid or revoked: {0}")]
    TokenInvalid(String),

    #[error("Access token rejected by provider: {0}")]
    Unauthorized(String),

    #[error("No calendar event found for source event: {0}")]
    EventNotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for TempoLink operations
pub type Result<T> = std::result::Result<T, TempoLinkError>;
