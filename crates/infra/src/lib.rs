//! # TempoLink Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite-backed credential store
//! - OAuth token client against the Microsoft identity platform
//! - Microsoft Graph calendar client
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `tempolink-core`
//! - Contains all "impure" code (I/O, HTTP, storage)

pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod identity;
pub mod msgraph;

// Re-export commonly used items
pub use database::SqliteCredentialStore;
pub use errors::InfraError;
pub use http::HttpClientBuilder;
pub use identity::IdentityClient;
pub use msgraph::GraphCalendarClient;
