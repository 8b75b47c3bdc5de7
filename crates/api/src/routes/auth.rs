//! Connect and disconnect flows

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::context::AppContext;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenExchangeRequest {
    pub user_id: String,
    pub code: String,
    pub code_verifier: String,
}

/// Complete the PKCE authorization-code exchange and persist the connected
/// credential bundle.
pub async fn exchange_token(
    State(context): State<Arc<AppContext>>,
    Json(request): Json<TokenExchangeRequest>,
) -> Result<Json<Value>, ApiError> {
    context
        .engine
        .connect(&request.user_id, &request.code, &request.code_verifier)
        .await?;
    info!(user = %request.user_id, "calendar connected");
    Ok(Json(json!({ "connectionState": "connected" })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisconnectRequest {
    pub user_id: String,
}

/// Tear down delegated access for a user.
pub async fn disconnect(
    State(context): State<Arc<AppContext>>,
    Json(request): Json<DisconnectRequest>,
) -> Result<Json<Value>, ApiError> {
    context.engine.disconnect(&request.user_id).await?;
    info!(user = %request.user_id, "calendar disconnected");
    Ok(Json(json!({ "connectionState": "disconnected" })))
}
