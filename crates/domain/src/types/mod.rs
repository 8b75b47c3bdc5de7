//! Common data types used throughout the application

pub mod credentials;
pub mod event;
pub mod webhook;

pub use credentials::*;
pub use event::*;
pub use webhook::*;
