//! # TempoLink Core
//!
//! Core business logic for the credential and event-sync engine.
//!
//! This crate contains:
//! - Port traits for the credential store, token client, and calendar API
//! - The sync engine orchestrating token refresh and calendar writes
//! - Batch planning for bulk synchronization
//! - Connection lifecycle transitions
//!
//! ## Architecture
//! - Depends only on `tempolink-domain`
//! - No I/O implementations; infrastructure crates implement the ports

pub mod batch;
pub mod connection;
pub mod engine;
pub mod ports;

pub use batch::{plan_chunks, BatchFailure, BulkSyncReport};
pub use connection::Transition;
pub use engine::{SyncEngine, WriteMode};
pub use ports::{BatchItemResult, CalendarApi, CredentialStore, OperationOutcome, TokenClient};
