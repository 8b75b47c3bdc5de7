//! Inbound webhook payloads
//!
//! Wire shapes for the source system's webhook notifications, camelCase on
//! the wire. These deserialize verbatim and are immediately normalized into
//! a [`crate::types::event::LogicalSyncEvent`] by the per-kind constructors.

use serde::{Deserialize, Serialize};

/// Project reference attached to a time entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectRef {
    pub name: Option<String>,
    pub client_name: Option<String>,
}

/// Task reference attached to a time entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskRef {
    pub name: Option<String>,
}

/// Start/end instants of a tracked time entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeInterval {
    pub start: String,
    pub end: String,
}

/// Webhook body for time-entry created/updated notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryPayload {
    pub user_id: String,
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project: Option<ProjectRef>,
    #[serde(default)]
    pub task: Option<TaskRef>,
    pub time_interval: TimeInterval,
}

/// Date-level period, used by time off and scheduled assignments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub start: String,
    pub end: String,
}

/// `HH:MM` clock interval for half-day time off.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockInterval {
    pub start: String,
    pub end: String,
}

/// Time-off request window. Half-day requests carry the clock sub-interval
/// alongside the full-day period.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeOffPeriod {
    pub period: Period,
    #[serde(default)]
    pub half_day: bool,
    #[serde(default)]
    pub half_day_hours: Option<ClockInterval>,
}

/// Webhook body for approved time-off notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeOffPayload {
    pub user_id: String,
    pub id: String,
    #[serde(default)]
    pub note: Option<String>,
    pub time_off_period: TimeOffPeriod,
}

/// Webhook body for scheduled-assignment notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPayload {
    pub user_id: String,
    pub id: String,
    #[serde(default)]
    pub note: Option<String>,
    pub period: Period,
    #[serde(default)]
    pub start_time: Option<String>,
    pub hours_per_day: f64,
}

#[cfg(test)]
mod tests {
    //! Unit tests for types::webhook.
    use super::*;

    #[test]
    fn time_entry_payload_deserializes_camel_case() {
        let json = serde_json::json!({
            "userId": "user-1",
            "id": "entry-1",
            "description": "standup",
            "project": { "name": "Apollo", "clientName": "Acme" },
            "timeInterval": {
                "start": "2024-01-10T09:00:00Z",
                "end": "2024-01-10T09:15:00Z"
            }
        });

        let payload: TimeEntryPayload = serde_json::from_value(json).unwrap();
        assert_eq!(payload.user_id, "user-1");
        assert_eq!(payload.project.unwrap().client_name.as_deref(), Some("Acme"));
        assert!(payload.task.is_none());
    }

    #[test]
    fn time_off_payload_defaults_half_day_fields() {
        let json = serde_json::json!({
            "userId": "user-1",
            "id": "off-1",
            "timeOffPeriod": {
                "period": { "start": "2024-02-01", "end": "2024-02-03" }
            }
        });

        let payload: TimeOffPayload = serde_json::from_value(json).unwrap();
        assert!(!payload.time_off_period.half_day);
        assert!(payload.time_off_period.half_day_hours.is_none());
        assert!(payload.note.is_none());
    }

    #[test]
    fn assignment_payload_deserializes_optional_start_time() {
        let json = serde_json::json!({
            "userId": "user-1",
            "id": "assign-1",
            "note": "onsite",
            "period": { "start": "2024-03-04", "end": "2024-03-08" },
            "startTime": "09:30",
            "hoursPerDay": 7.5
        });

        let payload: AssignmentPayload = serde_json::from_value(json).unwrap();
        assert_eq!(payload.start_time.as_deref(), Some("09:30"));
        assert!((payload.hours_per_day - 7.5).abs() < f64::EPSILON);
    }
}
