//! Integration manifest
//!
//! Descriptor the tracking platform fetches when the add-on is installed:
//! webhook subscriptions, UI component, and the scopes the integration
//! needs to read source records.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::context::AppContext;

pub async fn manifest(State(context): State<Arc<AppContext>>) -> Json<Value> {
    let base_url = &context.config.server.public_base_url;

    Json(json!({
        "key": "OutlookCalendarIntegration",
        "name": "TempoLink Outlook Sync",
        "description": "Transfer time entries, approved time off, and scheduled assignments to Outlook Calendar",
        "baseUrl": base_url,
        "iconPath": "/tab_icon.svg",
        "lifecycle": [
            { "type": "INSTALLED", "path": "/lifecycle/installed" },
            { "type": "DELETED", "path": "/lifecycle/uninstalled" },
            { "type": "SETTINGS_UPDATED", "path": "/lifecycle/settings-updated" }
        ],
        "webhooks": [
            { "event": "NEW_TIME_ENTRY", "path": "/webhook/new-time-entry" },
            { "event": "TIME_ENTRY_UPDATED", "path": "/webhook/time-entry-updated" },
            { "event": "TIME_OFF_REQUEST_APPROVED", "path": "/webhook/time-off-request-approved" },
            { "event": "ASSIGNMENT_PUBLISHED", "path": "/webhook/assignment-published" },
            { "event": "ASSIGNMENT_UPDATED", "path": "/webhook/assignment-updated" }
        ],
        "components": [
            {
                "type": "sidebar",
                "accessLevel": "EVERYONE",
                "path": "/",
                "label": "Outlook Calendar Sync",
                "iconPath": "tab_icon.svg"
            }
        ],
        "minimalSubscriptionPlan": "FREE",
        "scopes": [
            "CLIENT_READ",
            "PROJECT_READ",
            "TASK_READ",
            "TIME_ENTRY_READ",
            "USER_READ",
            "WORKSPACE_READ",
            "APPROVAL_READ",
            "TIME_OFF_READ",
            "SCHEDULING_READ"
        ]
    }))
}
