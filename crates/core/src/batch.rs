//! Batch planning for bulk synchronization
//!
//! Bulk sync submits events in fixed-size chunks. Planning is pure; the
//! engine owns submission order and pacing.

use serde::{Deserialize, Serialize};
use tempolink_domain::LogicalSyncEvent;

use crate::ports::BatchItemResult;

/// Split events into submission chunks of at most `limit` items, preserving
/// input order within and across chunks.
pub fn plan_chunks(events: &[LogicalSyncEvent], limit: usize) -> Vec<&[LogicalSyncEvent]> {
    if events.is_empty() {
        return Vec::new();
    }
    events.chunks(limit.max(1)).collect()
}

/// One failed event from a bulk run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFailure {
    pub source_event_id: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate outcome of a bulk sync run. Failures are per-event; one bad
/// chunk never aborts the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSyncReport {
    pub requested: usize,
    pub created: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub failures: Vec<BatchFailure>,
}

impl BulkSyncReport {
    /// Fold one chunk's correlated results into the report.
    pub fn absorb(&mut self, results: &[BatchItemResult]) {
        for result in results {
            if result.succeeded() {
                self.created += 1;
            } else {
                self.failed += 1;
                self.failures.push(BatchFailure {
                    source_event_id: result.source_event_id.clone(),
                    status: result.status,
                    error: result.error.clone(),
                });
            }
        }
    }

    /// Mark an entire chunk failed, e.g. when the batch call itself did not
    /// go through.
    pub fn fail_chunk(&mut self, chunk: &[LogicalSyncEvent], error: &str) {
        for event in chunk {
            self.failed += 1;
            self.failures.push(BatchFailure {
                source_event_id: event.source_event_id.clone(),
                status: 0,
                error: Some(error.to_string()),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for batch planning.
    use chrono::{TimeZone, Utc};
    use tempolink_domain::{EventCategory, SyncEventKind, TimeRange};

    use super::*;

    fn event(id: &str) -> LogicalSyncEvent {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        LogicalSyncEvent {
            source_event_id: id.to_string(),
            kind: SyncEventKind::TimeEntry,
            time_range: TimeRange::new(start, end).unwrap(),
            subject: "test".into(),
            category: EventCategory::TimeEntry,
        }
    }

    #[test]
    fn chunks_respect_limit_and_preserve_order() {
        let events: Vec<_> = (0..45).map(|i| event(&format!("e{i}"))).collect();
        let chunks = plan_chunks(&events, 20);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 20);
        assert_eq!(chunks[1].len(), 20);
        assert_eq!(chunks[2].len(), 5);
        assert_eq!(chunks[0][0].source_event_id, "e0");
        assert_eq!(chunks[2][4].source_event_id, "e44");
    }

    #[test]
    fn empty_input_plans_no_chunks() {
        assert!(plan_chunks(&[], 20).is_empty());
    }

    #[test]
    fn zero_limit_is_clamped() {
        let events = vec![event("a"), event("b")];
        let chunks = plan_chunks(&events, 0);
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn report_splits_successes_from_failures() {
        let mut report = BulkSyncReport::default();
        report.absorb(&[
            BatchItemResult { source_event_id: "a".into(), status: 201, error: None },
            BatchItemResult {
                source_event_id: "b".into(),
                status: 429,
                error: Some("throttled".into()),
            },
        ]);

        assert_eq!(report.created, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.failures[0].source_event_id, "b");
    }
}
