//! Wire payloads for Microsoft Graph calendar events
//!
//! Event bodies always carry the source event id verbatim; the locator's
//! fallback filter depends on it. Time entries additionally pin the id in a
//! single-value extended property, which is the primary lookup key.

use serde::Serialize;
use tempolink_domain::constants::SOURCE_ID_PROPERTY;
use tempolink_domain::{LogicalSyncEvent, SyncEventKind};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: String,
    pub time_zone: &'static str,
}

impl EventDateTime {
    fn utc(instant: chrono::DateTime<chrono::Utc>) -> Self {
        Self { date_time: instant.format("%Y-%m-%dT%H:%M:%S").to_string(), time_zone: "UTC" }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBody {
    pub content_type: &'static str,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ExtendedProperty {
    pub id: &'static str,
    pub value: String,
}

/// Payload for creating a calendar event.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEventPayload {
    pub subject: String,
    pub body: EventBody,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_as: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub single_value_extended_properties: Option<Vec<ExtendedProperty>>,
}

impl NewEventPayload {
    pub fn from_event(event: &LogicalSyncEvent) -> Self {
        let extended = match event.kind {
            SyncEventKind::TimeEntry => Some(vec![ExtendedProperty {
                id: SOURCE_ID_PROPERTY,
                value: event.source_event_id.clone(),
            }]),
            _ => None,
        };

        Self {
            subject: event.subject.clone(),
            body: EventBody { content_type: "text", content: event.source_event_id.clone() },
            start: EventDateTime::utc(event.time_range.start),
            end: EventDateTime::utc(event.time_range.end),
            categories: vec![event.category.as_str().to_string()],
            // Time off blocks availability
            show_as: matches!(event.kind, SyncEventKind::TimeOff).then_some("oof"),
            single_value_extended_properties: extended,
        }
    }
}

/// Payload for patching an existing calendar event. The time range always
/// updates; the subject only follows for time entries, where it is derived
/// from mutable source fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
}

impl UpdateEventPayload {
    pub fn from_event(event: &LogicalSyncEvent) -> Self {
        Self {
            subject: matches!(event.kind, SyncEventKind::TimeEntry)
                .then(|| event.subject.clone()),
            start: EventDateTime::utc(event.time_range.start),
            end: EventDateTime::utc(event.time_range.end),
        }
    }
}
