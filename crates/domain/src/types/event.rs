//! Logical sync events
//!
//! A [`LogicalSyncEvent`] is the normalized, in-flight representation of one
//! source record (time entry, approved time off, scheduled assignment)
//! pending a calendar write. The per-kind constructors own all payload
//! normalization: subject composition, half-day sub-intervals, and
//! assignment start-time arithmetic. Handlers downstream never look at raw
//! payload shapes again.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, TempoLinkError};
use crate::types::webhook::{AssignmentPayload, TimeEntryPayload, TimeOffPayload};

/// Which source record kind produced a logical event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncEventKind {
    TimeEntry,
    TimeOff,
    ScheduledAssignment,
}

/// Provider-side category tag, used by the calendar UI to color-differentiate
/// synced events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventCategory {
    TimeEntry,
    TimeOff,
    Scheduled,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TimeEntry => "Blue category",
            Self::TimeOff => "Time Off",
            Self::Scheduled => "Tracked",
        }
    }
}

/// Half-open UTC interval with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end < start {
            return Err(TempoLinkError::Validation(format!(
                "time range end {end} precedes start {start}"
            )));
        }
        Ok(Self { start, end })
    }
}

/// Normalized source event pending a calendar write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogicalSyncEvent {
    /// Opaque source-system record id, embedded into the calendar event for
    /// later lookup.
    pub source_event_id: String,
    pub kind: SyncEventKind,
    pub time_range: TimeRange,
    pub subject: String,
    pub category: EventCategory,
}

impl LogicalSyncEvent {
    /// Build from a time-entry payload. Subject is composed as
    /// `"{client} : {project} : {task} - {description}"`, with each segment
    /// dropped when the payload lacks it.
    pub fn time_entry(payload: &TimeEntryPayload) -> Result<Self> {
        let start = parse_instant(&payload.time_interval.start)?;
        let end = parse_instant(&payload.time_interval.end)?;

        let subject = compose_subject(
            payload.project.as_ref().and_then(|p| p.client_name.as_deref()),
            payload.project.as_ref().and_then(|p| p.name.as_deref()),
            payload.task.as_ref().and_then(|t| t.name.as_deref()),
            payload.description.as_deref(),
        );

        Ok(Self {
            source_event_id: payload.id.clone(),
            kind: SyncEventKind::TimeEntry,
            time_range: TimeRange::new(start, end)?,
            subject,
            category: EventCategory::TimeEntry,
        })
    }

    /// Build from an approved time-off payload. Half-day requests use the
    /// half-day sub-interval on the period's start date instead of the full
    /// period.
    pub fn time_off(payload: &TimeOffPayload) -> Result<Self> {
        let period = &payload.time_off_period;

        let (start, end) = if period.half_day {
            let hours = period.half_day_hours.as_ref().ok_or_else(|| {
                TempoLinkError::Validation(format!(
                    "time off {} flags halfDay without halfDayHours",
                    payload.id
                ))
            })?;
            let date = parse_date(&period.period.start)?;
            (
                at_clock_time(date, &hours.start)?,
                at_clock_time(date, &hours.end)?,
            )
        } else {
            (parse_instant(&period.period.start)?, parse_instant(&period.period.end)?)
        };

        Ok(Self {
            source_event_id: payload.id.clone(),
            kind: SyncEventKind::TimeOff,
            time_range: TimeRange::new(start, end)?,
            subject: payload
                .note
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Time Off (Approved)".to_string()),
            category: EventCategory::TimeOff,
        })
    }

    /// Build from a scheduled-assignment payload. The event starts at the
    /// assignment's daily start time on the period's first day and runs for
    /// `hoursPerDay`.
    pub fn scheduled_assignment(payload: &AssignmentPayload) -> Result<Self> {
        let date = parse_date(&payload.period.start)?;
        let start = at_clock_time(date, payload.start_time.as_deref().unwrap_or("00:00"))?;
        let minutes = (payload.hours_per_day * 60.0).round() as i64;
        if minutes < 0 {
            return Err(TempoLinkError::Validation(format!(
                "assignment {} has negative hoursPerDay",
                payload.id
            )));
        }
        let end = start + Duration::minutes(minutes);

        Ok(Self {
            source_event_id: payload.id.clone(),
            kind: SyncEventKind::ScheduledAssignment,
            time_range: TimeRange::new(start, end)?,
            subject: payload
                .note
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "No title".to_string()),
            category: EventCategory::Scheduled,
        })
    }
}

/// Compose the display subject from the optional payload segments.
fn compose_subject(
    client: Option<&str>,
    project: Option<&str>,
    task: Option<&str>,
    description: Option<&str>,
) -> String {
    let client = client.map(|c| format!("{c} : ")).unwrap_or_default();
    let project = project.unwrap_or_default();
    let task = task.map(|t| format!(" : {t}")).unwrap_or_default();
    let description = description.map(|d| format!(" - {d}")).unwrap_or_default();
    format!("{client}{project}{task}{description}")
}

/// Parse a source timestamp. Accepts RFC 3339, a naive datetime (assumed
/// UTC), or a bare date (midnight UTC).
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc())
            .ok_or_else(|| TempoLinkError::Validation(format!("invalid date '{value}'")));
    }

    Err(TempoLinkError::Validation(format!("invalid timestamp '{value}'")))
}

/// Parse the date component of a source timestamp.
fn parse_date(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    parse_instant(trimmed).map(|dt| dt.date_naive())
}

/// Anchor a `HH:MM` clock time onto a date, in UTC.
fn at_clock_time(date: NaiveDate, clock: &str) -> Result<DateTime<Utc>> {
    let time = NaiveTime::parse_from_str(clock.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(clock.trim(), "%H:%M:%S"))
        .map_err(|e| TempoLinkError::Validation(format!("invalid clock time '{clock}': {e}")))?;
    Ok(date.and_time(time).and_utc())
}
