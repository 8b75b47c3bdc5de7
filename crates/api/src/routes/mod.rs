//! Route definitions

pub mod auth;
pub mod manifest;
pub mod sync;
pub mod webhooks;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;

use crate::context::AppContext;

/// Build the application router.
pub fn build_router(context: Arc<AppContext>) -> Router {
    Router::new()
        .route("/webhook/new-time-entry", post(webhooks::time_entry_created))
        .route("/webhook/time-entry-updated", post(webhooks::time_entry_updated))
        .route("/webhook/time-off-request-approved", post(webhooks::time_off_approved))
        .route("/webhook/assignment-published", post(webhooks::assignment_published))
        .route("/webhook/assignment-updated", post(webhooks::assignment_updated))
        .route("/auth/token", post(auth::exchange_token))
        .route("/auth/disconnect", post(auth::disconnect))
        .route("/sync/bulk", post(sync::bulk_sync))
        .route("/sync/flags", put(sync::set_flag))
        .route("/manifest", get(manifest::manifest))
        .with_state(context)
}
