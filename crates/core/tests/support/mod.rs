//! Shared test helpers for `tempolink-core` integration tests.
//!
//! In-memory implementations of the engine's ports with configurable
//! failure injection, so engine tests can focus on lifecycle behaviour
//! instead of boilerplate.

pub mod calendar;
pub mod store;
pub mod tokens;
