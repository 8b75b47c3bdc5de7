//! # TempoLink Domain
//!
//! Business domain types and models for TempoLink.
//!
//! This crate contains:
//! - Domain data types (credential bundles, logical sync events, payloads)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other TempoLink crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
