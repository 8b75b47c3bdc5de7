//! # TempoLink API
//!
//! Webhook and API server for the credential and event-sync engine.
//!
//! This crate contains:
//! - The axum router and route handlers
//! - HTTP status mapping for the domain error taxonomy
//! - Application context wiring infra implementations into the engine

pub mod context;
pub mod error;
pub mod routes;

pub use context::AppContext;
pub use error::ApiError;
pub use routes::build_router;
