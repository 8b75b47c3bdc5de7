//! Port interfaces for the sync engine
//!
//! Infrastructure crates implement these traits; the engine only sees the
//! abstractions. All methods return the domain `Result` so provider-specific
//! failures arrive already classified.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tempolink_domain::{
    CredentialPatch, LogicalSyncEvent, Result, TokenGrant, UserRecord,
};

/// Keyed persistence for user credential bundles.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load a user record. Unknown users are an error, not an empty record.
    async fn load(&self, user_id: &str) -> Result<UserRecord>;

    /// Apply a shallow merge patch to the user's provider sub-bundle,
    /// creating the record if it does not exist. Fields the patch does not
    /// name are preserved.
    async fn merge_update(&self, user_id: &str, patch: CredentialPatch) -> Result<()>;
}

/// OAuth client against the identity provider's token endpoint.
#[async_trait]
pub trait TokenClient: Send + Sync {
    /// Redeem a refresh token for a fresh grant.
    ///
    /// A provider response of `invalid_grant` maps to `TokenInvalid`;
    /// transport failures map to `Network` and must never be treated as a
    /// revoked token.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant>;

    /// Exchange an authorization code (PKCE) for the initial grant.
    async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<TokenGrant>;
}

/// Provider-side handle to a calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEventRef {
    /// Provider-assigned event id.
    pub id: String,
}

/// Outcome of one batch sub-request, correlated to its source event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItemResult {
    pub source_event_id: String,
    /// HTTP status of the sub-response.
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItemResult {
    pub fn succeeded(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Result of a single-event sync operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OperationOutcome {
    Created { event_id: String },
    Updated { event_id: String },
    /// The operation did not apply, e.g. the feature's sync toggle is off.
    Skipped { reason: String },
}

/// Calendar operations against the provider, scoped to one access token.
#[async_trait]
pub trait CalendarApi: Send + Sync {
    /// Locate the dedicated sync calendar, creating it if absent. Returns
    /// its provider id.
    async fn ensure_calendar(&self, access_token: &str) -> Result<String>;

    /// Find the calendar event previously created for a source event id.
    async fn find_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        source_event_id: &str,
    ) -> Result<Option<CalendarEventRef>>;

    /// Create a calendar event for a logical sync event.
    async fn create_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event: &LogicalSyncEvent,
    ) -> Result<CalendarEventRef>;

    /// Patch an existing calendar event to match a logical sync event.
    async fn update_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
        event: &LogicalSyncEvent,
    ) -> Result<()>;

    /// Create up to one chunk's worth of events in a single batch call.
    /// Returns one correlated result per input event.
    async fn create_events_batch(
        &self,
        access_token: &str,
        calendar_id: &str,
        events: &[LogicalSyncEvent],
    ) -> Result<Vec<BatchItemResult>>;
}
