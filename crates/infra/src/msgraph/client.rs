//! Microsoft Graph calendar client
//!
//! Implements the `CalendarApi` port over the Graph REST API. Event lookup
//! goes through the source-id extended property first and falls back to a
//! body-content filter for events created without the property; candidates
//! from either filter count only when the source id appears verbatim in the
//! event body, so nothing is ever patched on a nominal filter hit alone.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tempolink_core::ports::{BatchItemResult, CalendarApi, CalendarEventRef};
use tempolink_domain::constants::{
    GRAPH_API_BASE, OUTLOOK_TIMEZONE_HEADER, SOURCE_ID_PROPERTY, SYNC_CALENDAR_NAME,
};
use tempolink_domain::{LogicalSyncEvent, Result, TempoLinkError};
use tracing::{debug, instrument, warn};

use super::payloads::{NewEventPayload, UpdateEventPayload};
use crate::errors::InfraError;

/// Microsoft Graph calendar client.
#[derive(Clone)]
pub struct GraphCalendarClient {
    client: Client,
    base_url: String,
    calendar_name: String,
}

impl GraphCalendarClient {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, GRAPH_API_BASE)
    }

    /// Point the client at a different Graph endpoint, e.g. a mock server.
    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            calendar_name: SYNC_CALENDAR_NAME.to_string(),
        }
    }

    async fn list_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        filter: &str,
    ) -> Result<Vec<GraphEvent>> {
        let url = format!("{}/me/calendars/{}/events", self.base_url, calendar_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .header("Prefer", OUTLOOK_TIMEZONE_HEADER)
            .query(&[("$filter", filter)])
            .send()
            .await
            .map_err(request_failed)?;

        let listing: GraphListing<GraphEvent> = parse_success(response).await?;
        Ok(listing.value)
    }
}

#[async_trait]
impl CalendarApi for GraphCalendarClient {
    /// Locate the dedicated sync calendar by display name, creating it on
    /// first use.
    #[instrument(skip(self, access_token))]
    async fn ensure_calendar(&self, access_token: &str) -> Result<String> {
        let url = format!("{}/me/calendars", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(request_failed)?;

        let listing: GraphListing<GraphCalendar> = parse_success(response).await?;
        if let Some(found) = listing.value.into_iter().find(|c| c.name == self.calendar_name) {
            return Ok(found.id);
        }

        debug!(name = %self.calendar_name, "sync calendar missing, creating it");
        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "name": self.calendar_name }))
            .send()
            .await
            .map_err(request_failed)?;

        let created: GraphCalendar = parse_success(response).await?;
        Ok(created.id)
    }

    #[instrument(skip(self, access_token, calendar_id))]
    async fn find_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        source_event_id: &str,
    ) -> Result<Option<CalendarEventRef>> {
        let property_filter = format!(
            "singleValueExtendedProperties/Any(ep: ep/id eq '{SOURCE_ID_PROPERTY}' and ep/value eq '{source_event_id}')"
        );
        let by_property = self.list_events(access_token, calendar_id, &property_filter).await?;
        if let Some(matched) = verbatim_match(by_property, source_event_id) {
            return Ok(Some(matched));
        }

        // Events created without the extended property carry the source id
        // as their body content instead.
        let body_filter = format!("body/content eq '{source_event_id}'");
        let by_body = self.list_events(access_token, calendar_id, &body_filter).await?;
        let matched = verbatim_match(by_body, source_event_id);

        if matched.is_none() {
            debug!(source_event_id, "no calendar event matched source id");
        }
        Ok(matched)
    }

    #[instrument(skip_all, fields(source = %event.source_event_id))]
    async fn create_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event: &LogicalSyncEvent,
    ) -> Result<CalendarEventRef> {
        let url = format!("{}/me/calendars/{}/events", self.base_url, calendar_id);
        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .header("Prefer", OUTLOOK_TIMEZONE_HEADER)
            .json(&NewEventPayload::from_event(event))
            .send()
            .await
            .map_err(request_failed)?;

        let created: GraphEvent = parse_success(response).await?;
        Ok(CalendarEventRef { id: created.id })
    }

    #[instrument(skip_all, fields(source = %event.source_event_id, event_id))]
    async fn update_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
        event: &LogicalSyncEvent,
    ) -> Result<()> {
        let url = format!("{}/me/calendars/{}/events/{}", self.base_url, calendar_id, event_id);
        let response = self
            .client
            .patch(&url)
            .bearer_auth(access_token)
            .header("Prefer", OUTLOOK_TIMEZONE_HEADER)
            .json(&UpdateEventPayload::from_event(event))
            .send()
            .await
            .map_err(request_failed)?;

        parse_success::<serde_json::Value>(response).await?;
        Ok(())
    }

    /// Submit one chunk of creates through `$batch`. Sub-request ids are the
    /// 1-based chunk positions, which correlates responses back to events.
    #[instrument(skip_all, fields(count = events.len()))]
    async fn create_events_batch(
        &self,
        access_token: &str,
        calendar_id: &str,
        events: &[LogicalSyncEvent],
    ) -> Result<Vec<BatchItemResult>> {
        let requests: Vec<BatchRequest> = events
            .iter()
            .enumerate()
            .map(|(index, event)| BatchRequest {
                id: (index + 1).to_string(),
                method: "POST",
                url: format!("/me/calendars/{calendar_id}/events"),
                headers: BatchHeaders { content_type: "application/json" },
                body: NewEventPayload::from_event(event),
            })
            .collect();

        let url = format!("{}/$batch", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "requests": requests }))
            .send()
            .await
            .map_err(request_failed)?;

        let batch: BatchResponse = parse_success(response).await?;

        let mut results = Vec::with_capacity(events.len());
        for (index, event) in events.iter().enumerate() {
            let id = (index + 1).to_string();
            let sub = batch.responses.iter().find(|r| r.id == id);
            let result = match sub {
                Some(sub) => BatchItemResult {
                    source_event_id: event.source_event_id.clone(),
                    status: sub.status,
                    error: sub.error_message(),
                },
                None => BatchItemResult {
                    source_event_id: event.source_event_id.clone(),
                    status: 0,
                    error: Some("no response correlated to sub-request".into()),
                },
            };
            if !result.succeeded() {
                warn!(source = %event.source_event_id, status = result.status, "batch item failed");
            }
            results.push(result);
        }
        Ok(results)
    }
}

/// Select the first candidate whose body carries the source id verbatim.
/// Filter hits without it are spurious and never matched.
fn verbatim_match(events: Vec<GraphEvent>, source_event_id: &str) -> Option<CalendarEventRef> {
    events
        .into_iter()
        .find(|event| {
            event
                .body_preview
                .as_deref()
                .map(|preview| preview.trim() == source_event_id)
                .unwrap_or(false)
        })
        .map(|event| CalendarEventRef { id: event.id })
}

fn request_failed(err: reqwest::Error) -> TempoLinkError {
    InfraError(TempoLinkError::Network(format!("Graph request failed: {err}"))).into()
}

/// Map a Graph error status onto the domain taxonomy and parse the body.
async fn parse_success<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return response.json::<T>().await.map_err(|e| {
            InfraError(TempoLinkError::Provider(format!("failed to parse Graph response: {e}")))
                .into()
        });
    }

    let body = response.text().await.unwrap_or_default();
    let message = format!("Graph API error ({status}): {body}");
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TempoLinkError::Unauthorized(message),
        StatusCode::NOT_FOUND => TempoLinkError::EventNotFound(message),
        s if s.is_client_error() => TempoLinkError::Validation(message),
        _ => TempoLinkError::Provider(message),
    })
}

#[derive(Debug, Deserialize)]
struct GraphListing<T> {
    value: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct GraphCalendar {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct GraphEvent {
    id: String,
    #[serde(rename = "bodyPreview")]
    body_preview: Option<String>,
}

#[derive(Debug, Serialize)]
struct BatchRequest {
    id: String,
    method: &'static str,
    url: String,
    headers: BatchHeaders,
    body: NewEventPayload,
}

#[derive(Debug, Serialize)]
struct BatchHeaders {
    #[serde(rename = "Content-Type")]
    content_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    responses: Vec<BatchSubResponse>,
}

#[derive(Debug, Deserialize)]
struct BatchSubResponse {
    id: String,
    status: u16,
    body: Option<serde_json::Value>,
}

impl BatchSubResponse {
    fn error_message(&self) -> Option<String> {
        if (200..300).contains(&self.status) {
            return None;
        }
        self.body
            .as_ref()
            .and_then(|b| b.pointer("/error/message"))
            .and_then(|m| m.as_str())
            .map(String::from)
            .or_else(|| Some(format!("sub-request returned status {}", self.status)))
    }
}
