//! HTTP handler for the public client bootstrap configuration.

use axum::{extract::State, response::Json};

use crate::{AppState, api::models::config::ClientConfigResponse, errors::Result};

/// What the frontend needs to know before any user interaction.
#[utoipa::path(
    get,
    path = "/config",
    tag = "config",
    responses(
        (status = 200, description = "Client bootstrap configuration", body = ClientConfigResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_config(State(state): State<AppState>) -> Result<Json<ClientConfigResponse>> {
    Ok(Json(ClientConfigResponse {
        push_enabled: state.push.is_some(),
        billing_enabled: state.payment.is_some(),
        invite_required: state.config.invites.required,
        free_watchlist_limit: state.config.limits.free_watchlist_limit,
    }))
}
