//! Bulk sync and sync-flag routes

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tempolink_core::batch::BulkSyncReport;
use tempolink_domain::{
    AssignmentPayload, LogicalSyncEvent, Result as DomainResult, SyncFeature, TimeEntryPayload,
    TimeOffPayload,
};
use tracing::info;

use crate::context::AppContext;
use crate::error::ApiError;

/// Bulk sync request: the UI toggles a feature and ships the backlog of
/// source events to mirror into the calendar. Only the collection matching
/// the toggled feature is read.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSyncRequest {
    pub user_id: String,
    pub feature: SyncFeature,
    pub enabled: bool,
    #[serde(default)]
    pub time_entries: Vec<TimeEntryPayload>,
    #[serde(default)]
    pub time_off: Vec<TimeOffPayload>,
    #[serde(default)]
    pub assignments: Vec<AssignmentPayload>,
}

impl BulkSyncRequest {
    fn events(&self) -> DomainResult<Vec<LogicalSyncEvent>> {
        match self.feature {
            SyncFeature::TimeEntries => {
                self.time_entries.iter().map(LogicalSyncEvent::time_entry).collect()
            }
            SyncFeature::TimeOff => {
                self.time_off.iter().map(LogicalSyncEvent::time_off).collect()
            }
            SyncFeature::ScheduledTime => {
                self.assignments.iter().map(LogicalSyncEvent::scheduled_assignment).collect()
            }
        }
    }
}

/// Toggle a feature's sync flag, mirroring the backlog into the calendar
/// when enabling.
pub async fn bulk_sync(
    State(context): State<Arc<AppContext>>,
    Json(request): Json<BulkSyncRequest>,
) -> Result<Json<BulkSyncReport>, ApiError> {
    let events = request.events()?;
    let report = context
        .engine
        .bulk_sync(&request.user_id, request.feature, request.enabled, events)
        .await?;
    info!(
        user = %request.user_id,
        feature = request.feature.as_str(),
        enabled = request.enabled,
        created = report.created,
        failed = report.failed,
        "bulk sync finished"
    );
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagRequest {
    pub user_id: String,
    pub feature: SyncFeature,
    pub value: bool,
}

/// Set one sync toggle without touching the calendar.
pub async fn set_flag(
    State(context): State<Arc<AppContext>>,
    Json(request): Json<FlagRequest>,
) -> Result<StatusCode, ApiError> {
    context
        .engine
        .set_sync_flag(&request.user_id, request.feature, request.value)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
