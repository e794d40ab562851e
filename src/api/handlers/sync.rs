//! HTTP handler for the admin data-sync trigger.

use axum::{extract::State, http::HeaderMap, response::Json};

use crate::{
    AppState,
    auth::require_admin_key,
    errors::{Error, Result},
};

/// Dispatch the external market-data ingestion workflow.
#[utoipa::path(
    post,
    path = "/admin/sync",
    tag = "admin",
    responses(
        (status = 200, description = "Workflow dispatched"),
        (status = 401, description = "Invalid admin key"),
        (status = 404, description = "Admin endpoints are disabled"),
        (status = 501, description = "Data sync is not configured"),
        (status = 502, description = "Workflow dispatch failed"),
    ),
    security(("AdminKey" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn trigger_sync(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<serde_json::Value>> {
    require_admin_key(&state, &headers)?;

    let dispatcher = state.dispatcher.as_deref().ok_or_else(|| Error::NotConfigured {
        feature: "Data sync".to_string(),
    })?;

    dispatcher.dispatch().await?;

    Ok(Json(serde_json::json!({ "dispatched": true })))
}
