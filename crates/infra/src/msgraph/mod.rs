//! Microsoft Graph calendar integration

mod client;
mod payloads;

pub use client::GraphCalendarClient;
pub use payloads::{NewEventPayload, UpdateEventPayload};
