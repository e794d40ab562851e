//! HTTP handlers for notification settings.

use axum::{extract::State, response::Json};

use crate::{
    AppState,
    api::models::notification_settings::{NotificationSettingsResponse, default_settings, merge_with_defaults},
    api::models::users::CurrentUser,
    db::{errors::DbError, handlers::NotificationSettings},
    errors::{Error, Result},
};

/// The caller's settings, merged over server defaults.
#[utoipa::path(
    get,
    path = "/notification-settings",
    tag = "push",
    responses(
        (status = 200, description = "Effective notification settings", body = NotificationSettingsResponse),
        (status = 404, description = "Identity has never registered"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn get_settings(State(state): State<AppState>, user: CurrentUser) -> Result<Json<NotificationSettingsResponse>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut repo = NotificationSettings::new(&mut conn);

    let settings = match repo.get(user.id).await? {
        Some(stored) => merge_with_defaults(&stored.settings),
        None => default_settings(),
    };

    Ok(Json(NotificationSettingsResponse { settings }))
}

/// Replace the caller's settings blob wholesale.
#[utoipa::path(
    put,
    path = "/notification-settings",
    tag = "push",
    responses(
        (status = 200, description = "Saved settings, merged over defaults", body = NotificationSettingsResponse),
        (status = 400, description = "Body is not a JSON object"),
        (status = 404, description = "Identity has never registered"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn put_settings(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<NotificationSettingsResponse>> {
    if !body.is_object() {
        return Err(Error::BadRequest {
            message: "settings must be a JSON object".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut repo = NotificationSettings::new(&mut conn);

    let saved = repo.replace(user.id, &body).await?;

    Ok(Json(NotificationSettingsResponse {
        settings: merge_with_defaults(&saved.settings),
    }))
}
