//! Webhook handlers for tracking-platform notifications
//!
//! Five webhook subscriptions funnel into one handling path: normalize the
//! payload into a logical sync event, then hand it to the engine with the
//! matching write mode. Assignment webhooks are additionally gated on the
//! user's scheduled-time sync toggle; the original subscription fires for
//! every user in the workspace regardless of their settings.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use tempolink_core::engine::WriteMode;
use tempolink_core::ports::OperationOutcome;
use tempolink_domain::{
    AssignmentPayload, LogicalSyncEvent, SyncFeature, TimeEntryPayload, TimeOffPayload,
};
use tracing::info;

use crate::context::AppContext;
use crate::error::ApiError;

type HandlerResult = Result<Json<OperationOutcome>, ApiError>;

async fn handle(
    context: &AppContext,
    user_id: &str,
    event: LogicalSyncEvent,
    mode: WriteMode,
) -> HandlerResult {
    let outcome = context.engine.sync_event(user_id, &event, mode).await?;
    info!(user = user_id, source = %event.source_event_id, ?mode, "webhook processed");
    Ok(Json(outcome))
}

pub async fn time_entry_created(
    State(context): State<Arc<AppContext>>,
    Json(payload): Json<TimeEntryPayload>,
) -> HandlerResult {
    let event = LogicalSyncEvent::time_entry(&payload)?;
    handle(&context, &payload.user_id, event, WriteMode::Create).await
}

pub async fn time_entry_updated(
    State(context): State<Arc<AppContext>>,
    Json(payload): Json<TimeEntryPayload>,
) -> HandlerResult {
    let event = LogicalSyncEvent::time_entry(&payload)?;
    handle(&context, &payload.user_id, event, WriteMode::Update).await
}

pub async fn time_off_approved(
    State(context): State<Arc<AppContext>>,
    Json(payload): Json<TimeOffPayload>,
) -> HandlerResult {
    let event = LogicalSyncEvent::time_off(&payload)?;
    handle(&context, &payload.user_id, event, WriteMode::Create).await
}

pub async fn assignment_published(
    State(context): State<Arc<AppContext>>,
    Json(payload): Json<AssignmentPayload>,
) -> HandlerResult {
    assignment(&context, payload, WriteMode::Create).await
}

pub async fn assignment_updated(
    State(context): State<Arc<AppContext>>,
    Json(payload): Json<AssignmentPayload>,
) -> HandlerResult {
    assignment(&context, payload, WriteMode::Update).await
}

async fn assignment(
    context: &AppContext,
    payload: AssignmentPayload,
    mode: WriteMode,
) -> HandlerResult {
    if !context
        .engine
        .feature_enabled(&payload.user_id, SyncFeature::ScheduledTime)
        .await?
    {
        info!(user = %payload.user_id, "scheduled-time sync disabled, skipping assignment");
        return Ok(Json(OperationOutcome::Skipped {
            reason: "scheduled-time sync is disabled for this user".into(),
        }));
    }

    let event = LogicalSyncEvent::scheduled_assignment(&payload)?;
    handle(context, &payload.user_id, event, mode).await
}
