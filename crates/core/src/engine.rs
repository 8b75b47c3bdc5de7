//! Sync engine - core orchestration logic
//!
//! The engine owns the token lifecycle around every calendar operation:
//! refresh before use, persist the rotated pair, tolerate refresh races, and
//! disconnect only on a confirmed revoked grant. Calendar writes themselves
//! are delegated to the [`CalendarApi`] port.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{instrument, warn};

use tempolink_domain::constants::{BATCH_PAUSE_MS, GRAPH_BATCH_LIMIT};
use tempolink_domain::{
    ConnectionState, CredentialPatch, LogicalSyncEvent, ProviderCredentials, Result, SyncFeature,
    TempoLinkError, TokenGrant,
};

use crate::batch::{plan_chunks, BulkSyncReport};
use crate::connection::Transition;
use crate::ports::{CalendarApi, CredentialStore, OperationOutcome, TokenClient};

/// How a single-event sync applies to the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Create a new calendar event.
    Create,
    /// Locate the previously created event by source id and patch it.
    Update,
}

/// Authenticated context for one run of calendar operations.
struct Session {
    access_token: String,
    calendar_id: String,
}

/// Orchestrates credential lifecycle and calendar writes per user.
pub struct SyncEngine {
    store: Arc<dyn CredentialStore>,
    tokens: Arc<dyn TokenClient>,
    calendar: Arc<dyn CalendarApi>,
    /// Serializes token refresh per user so concurrent operations never race
    /// each other's rotation within this process.
    user_locks: DashMap<String, Arc<Mutex<()>>>,
    batch_limit: usize,
    chunk_pause: Duration,
}

impl SyncEngine {
    /// Create a new engine over the given ports.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        tokens: Arc<dyn TokenClient>,
        calendar: Arc<dyn CalendarApi>,
    ) -> Self {
        Self {
            store,
            tokens,
            calendar,
            user_locks: DashMap::new(),
            batch_limit: GRAPH_BATCH_LIMIT,
            chunk_pause: Duration::from_millis(BATCH_PAUSE_MS),
        }
    }

    /// Override the batch chunk size.
    pub fn with_batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = limit;
        self
    }

    /// Override the pause between batch chunks.
    pub fn with_chunk_pause(mut self, pause: Duration) -> Self {
        self.chunk_pause = pause;
        self
    }

    /// Sync one logical event into the user's calendar.
    ///
    /// An `Unauthorized` from the calendar call gets exactly one
    /// refresh-then-retry; a second rejection propagates.
    #[instrument(skip(self, event), fields(user = user_id, source = %event.source_event_id))]
    pub async fn sync_event(
        &self,
        user_id: &str,
        event: &LogicalSyncEvent,
        mode: WriteMode,
    ) -> Result<OperationOutcome> {
        let session = self.establish(user_id).await?;
        match self.write_event(&session, event, mode).await {
            Err(TempoLinkError::Unauthorized(reason)) => {
                warn!(%reason, "calendar rejected access token, refreshing once");
                let session = self.establish(user_id).await?;
                self.write_event(&session, event, mode).await
            }
            other => other,
        }
    }

    /// Bulk-sync a feature: create calendar events for the given backlog when
    /// enabling, then persist the sync flag. The flag is persisted even when
    /// some events fail; failures are reported per event.
    #[instrument(skip(self, events), fields(user = user_id, count = events.len()))]
    pub async fn bulk_sync(
        &self,
        user_id: &str,
        feature: SyncFeature,
        enable: bool,
        events: Vec<LogicalSyncEvent>,
    ) -> Result<BulkSyncReport> {
        self.store.load(user_id).await?;

        let mut report = BulkSyncReport::default();
        if enable && !events.is_empty() {
            report.requested = events.len();
            let session = self.establish(user_id).await?;
            let chunks = plan_chunks(&events, self.batch_limit);
            for (index, chunk) in chunks.iter().enumerate() {
                if index > 0 {
                    tokio::time::sleep(self.chunk_pause).await;
                }
                match self
                    .calendar
                    .create_events_batch(&session.access_token, &session.calendar_id, chunk)
                    .await
                {
                    Ok(results) => report.absorb(&results),
                    Err(err) => {
                        warn!(chunk = index, error = %err, "batch chunk failed");
                        report.fail_chunk(chunk, &err.to_string());
                    }
                }
            }
        }

        self.store
            .merge_update(user_id, CredentialPatch::sync_flag(feature, enable))
            .await?;
        Ok(report)
    }

    /// Set one sync toggle without touching the calendar.
    pub async fn set_sync_flag(
        &self,
        user_id: &str,
        feature: SyncFeature,
        value: bool,
    ) -> Result<()> {
        self.store.load(user_id).await?;
        self.store
            .merge_update(user_id, CredentialPatch::sync_flag(feature, value))
            .await
    }

    /// Complete the connect flow: exchange the authorization code and persist
    /// the connected bundle.
    #[instrument(skip(self, code, code_verifier), fields(user = user_id))]
    pub async fn connect(&self, user_id: &str, code: &str, code_verifier: &str) -> Result<()> {
        let grant = self.tokens.exchange_code(code, code_verifier).await?;
        self.store
            .merge_update(user_id, Transition::Connected(grant.into_pair()).patch())
            .await
    }

    /// Tear down delegated access. Sibling fields of the bundle survive.
    #[instrument(skip(self), fields(user = user_id))]
    pub async fn disconnect(&self, user_id: &str) -> Result<()> {
        self.store.load(user_id).await?;
        self.store
            .merge_update(user_id, Transition::Disconnected.patch())
            .await
    }

    /// Whether a feature's sync toggle is on for this user.
    pub async fn feature_enabled(&self, user_id: &str, feature: SyncFeature) -> Result<bool> {
        let record = self.store.load(user_id).await?;
        Ok(record
            .azure
            .map(|creds| creds.feature_enabled(feature))
            .unwrap_or(false))
    }

    /// Observable connection state of a user's bundle.
    pub async fn connection_state(&self, user_id: &str) -> Result<ConnectionState> {
        let record = self.store.load(user_id).await?;
        Ok(ConnectionState::of(record.azure.as_ref()))
    }

    /// Refresh the user's token, persist the rotated pair, and resolve the
    /// dedicated calendar. Serialized per user; the lock entry is removed
    /// once no other task holds it, so the map is bounded by in-flight users.
    async fn establish(&self, user_id: &str) -> Result<Session> {
        let lock = self.user_lock(user_id);
        let session = {
            let _guard = lock.lock().await;
            self.establish_session(user_id).await
        };
        drop(lock);
        self.user_locks
            .remove_if(user_id, |_, entry| Arc::strong_count(entry) == 1);
        session
    }

    async fn establish_session(&self, user_id: &str) -> Result<Session> {
        let creds = self.connected_credentials(user_id).await?;

        let grant = match self.tokens.refresh(&creds.refresh_token).await {
            Ok(grant) => grant,
            Err(TempoLinkError::TokenInvalid(reason)) => {
                self.retry_with_stored_token(user_id, &creds.refresh_token, reason)
                    .await?
            }
            // Transport and provider failures are transient; the stored
            // bundle stays connected.
            Err(err) => return Err(err),
        };

        let pair = grant.into_pair();
        self.store
            .merge_update(user_id, Transition::Refreshed(pair.clone()).patch())
            .await?;

        let calendar_id = match creds.calendar_id {
            Some(id) => id,
            None => {
                let id = self.calendar.ensure_calendar(&pair.access_token).await?;
                self.store
                    .merge_update(user_id, CredentialPatch::calendar(id.clone()))
                    .await?;
                id
            }
        };

        Ok(Session { access_token: pair.access_token, calendar_id })
    }

    /// Handle a rejected refresh token. If the store holds a newer token than
    /// the one we presented, another worker rotated the pair first; retry
    /// once with the stored token. Only a rejection of the freshest stored
    /// token disconnects the user.
    async fn retry_with_stored_token(
        &self,
        user_id: &str,
        rejected: &str,
        reason: String,
    ) -> Result<TokenGrant> {
        let fresh = self.connected_credentials(user_id).await?;
        if fresh.refresh_token != rejected {
            match self.tokens.refresh(&fresh.refresh_token).await {
                Ok(grant) => return Ok(grant),
                Err(TempoLinkError::TokenInvalid(reason)) => {
                    self.expire(user_id).await?;
                    return Err(TempoLinkError::TokenInvalid(reason));
                }
                Err(err) => return Err(err),
            }
        }

        self.expire(user_id).await?;
        Err(TempoLinkError::TokenInvalid(reason))
    }

    async fn expire(&self, user_id: &str) -> Result<()> {
        warn!(user = user_id, "refresh token revoked, disconnecting");
        self.store
            .merge_update(user_id, Transition::Expired.patch())
            .await
    }

    async fn connected_credentials(&self, user_id: &str) -> Result<ProviderCredentials> {
        let record = self.store.load(user_id).await?;
        match record.azure {
            Some(creds) if creds.connected => Ok(creds),
            _ => Err(TempoLinkError::NotConnected(format!(
                "user {user_id} has no connected calendar"
            ))),
        }
    }

    fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        self.user_locks
            .entry(user_id.to_string())
            .or_default()
            .clone()
    }

    async fn write_event(
        &self,
        session: &Session,
        event: &LogicalSyncEvent,
        mode: WriteMode,
    ) -> Result<OperationOutcome> {
        match mode {
            WriteMode::Create => {
                let created = self
                    .calendar
                    .create_event(&session.access_token, &session.calendar_id, event)
                    .await?;
                Ok(OperationOutcome::Created { event_id: created.id })
            }
            WriteMode::Update => {
                let found = self
                    .calendar
                    .find_event(&session.access_token, &session.calendar_id, &event.source_event_id)
                    .await?
                    .ok_or_else(|| {
                        TempoLinkError::EventNotFound(format!(
                            "no calendar event for source {}",
                            event.source_event_id
                        ))
                    })?;
                self.calendar
                    .update_event(&session.access_token, &session.calendar_id, &found.id, event)
                    .await?;
                Ok(OperationOutcome::Updated { event_id: found.id })
            }
        }
    }
}
