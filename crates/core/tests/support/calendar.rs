use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempolink_core::ports::{BatchItemResult, CalendarApi, CalendarEventRef};
use tempolink_domain::{LogicalSyncEvent, Result as DomainResult, TempoLinkError};

/// In-memory mock for `CalendarApi`.
///
/// Stores created events keyed by source id and supports two kinds of
/// failure injection: rejecting the first N write calls as unauthorized,
/// and failing whole batch chunks by index.
#[derive(Default)]
pub struct MockCalendarApi {
    events: Mutex<HashMap<String, String>>,
    created: Mutex<Vec<LogicalSyncEvent>>,
    updated: Mutex<Vec<(String, LogicalSyncEvent)>>,
    ensure_calls: AtomicUsize,
    batch_calls: AtomicUsize,
    next_id: AtomicUsize,
    reject_unauthorized: AtomicUsize,
    failing_chunks: Mutex<HashSet<usize>>,
    failing_sources: Mutex<HashSet<String>>,
}

impl MockCalendarApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Seed an existing calendar event for a source id.
    pub fn with_existing(self: Arc<Self>, source_event_id: &str, event_id: &str) -> Arc<Self> {
        self.events
            .lock()
            .unwrap()
            .insert(source_event_id.to_string(), event_id.to_string());
        self
    }

    /// Reject the next `n` write calls with `Unauthorized`.
    pub fn reject_unauthorized(&self, n: usize) {
        self.reject_unauthorized.store(n, Ordering::SeqCst);
    }

    /// Fail the batch call with the given zero-based index.
    pub fn fail_chunk(&self, index: usize) {
        self.failing_chunks.lock().unwrap().insert(index);
    }

    /// Fail individual batch items for the given source id.
    pub fn fail_source(&self, source_event_id: &str) {
        self.failing_sources
            .lock()
            .unwrap()
            .insert(source_event_id.to_string());
    }

    pub fn ensure_calls(&self) -> usize {
        self.ensure_calls.load(Ordering::SeqCst)
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    pub fn created_events(&self) -> Vec<LogicalSyncEvent> {
        self.created.lock().unwrap().clone()
    }

    pub fn updated_events(&self) -> Vec<(String, LogicalSyncEvent)> {
        self.updated.lock().unwrap().clone()
    }

    fn check_unauthorized(&self) -> DomainResult<()> {
        let remaining = self.reject_unauthorized.load(Ordering::SeqCst);
        if remaining > 0 {
            self.reject_unauthorized.store(remaining - 1, Ordering::SeqCst);
            return Err(TempoLinkError::Unauthorized("access token expired".into()));
        }
        Ok(())
    }

    fn mint_id(&self) -> String {
        format!("evt-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[async_trait]
impl CalendarApi for MockCalendarApi {
    async fn ensure_calendar(&self, _access_token: &str) -> DomainResult<String> {
        self.ensure_calls.fetch_add(1, Ordering::SeqCst);
        Ok("cal-1".to_string())
    }

    async fn find_event(
        &self,
        _access_token: &str,
        _calendar_id: &str,
        source_event_id: &str,
    ) -> DomainResult<Option<CalendarEventRef>> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .get(source_event_id)
            .map(|id| CalendarEventRef { id: id.clone() }))
    }

    async fn create_event(
        &self,
        _access_token: &str,
        _calendar_id: &str,
        event: &LogicalSyncEvent,
    ) -> DomainResult<CalendarEventRef> {
        self.check_unauthorized()?;
        let id = self.mint_id();
        self.events
            .lock()
            .unwrap()
            .insert(event.source_event_id.clone(), id.clone());
        self.created.lock().unwrap().push(event.clone());
        Ok(CalendarEventRef { id })
    }

    async fn update_event(
        &self,
        _access_token: &str,
        _calendar_id: &str,
        event_id: &str,
        event: &LogicalSyncEvent,
    ) -> DomainResult<()> {
        self.check_unauthorized()?;
        self.updated
            .lock()
            .unwrap()
            .push((event_id.to_string(), event.clone()));
        Ok(())
    }

    async fn create_events_batch(
        &self,
        _access_token: &str,
        _calendar_id: &str,
        events: &[LogicalSyncEvent],
    ) -> DomainResult<Vec<BatchItemResult>> {
        let call = self.batch_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_chunks.lock().unwrap().contains(&call) {
            return Err(TempoLinkError::Provider("batch submission failed".into()));
        }

        let failing = self.failing_sources.lock().unwrap().clone();
        let mut results = Vec::with_capacity(events.len());
        for event in events {
            if failing.contains(&event.source_event_id) {
                results.push(BatchItemResult {
                    source_event_id: event.source_event_id.clone(),
                    status: 429,
                    error: Some("throttled".into()),
                });
                continue;
            }
            let id = self.mint_id();
            self.events
                .lock()
                .unwrap()
                .insert(event.source_event_id.clone(), id);
            self.created.lock().unwrap().push(event.clone());
            results.push(BatchItemResult {
                source_event_id: event.source_event_id.clone(),
                status: 201,
                error: None,
            });
        }
        Ok(results)
    }
}
