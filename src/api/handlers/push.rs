//! HTTP handlers for web-push subscription management.

use axum::{extract::State, http::StatusCode, response::Json};

use crate::{
    AppState,
    api::models::push::{PushSubscribe, PushSubscriptionResponse, PushUnsubscribe, VapidKeyResponse},
    api::models::users::CurrentUser,
    db::{
        errors::DbError,
        handlers::PushSubscriptions,
        models::push_subscriptions::PushSubscriptionCreateDBRequest,
        retry::with_retries,
    },
    errors::{Error, Result},
    push::{PushOutcome, PushPayload},
};

fn push_service(state: &AppState) -> Result<&crate::push::PushService> {
    state.push.as_deref().ok_or_else(|| Error::NotConfigured {
        feature: "Push notifications".to_string(),
    })
}

/// The public VAPID key browsers need to subscribe.
#[utoipa::path(
    get,
    path = "/push/key",
    tag = "push",
    responses(
        (status = 200, description = "Public VAPID key", body = VapidKeyResponse),
        (status = 501, description = "Push is not configured"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn vapid_key(State(state): State<AppState>) -> Result<Json<VapidKeyResponse>> {
    let service = push_service(&state)?;
    Ok(Json(VapidKeyResponse {
        public_key: service.public_key().to_string(),
    }))
}

/// Register (or refresh) a push subscription for the caller.
#[utoipa::path(
    post,
    path = "/push/subscribe",
    tag = "push",
    request_body = PushSubscribe,
    responses(
        (status = 201, description = "Subscription stored", body = PushSubscriptionResponse),
        (status = 400, description = "Missing endpoint or keys"),
        (status = 404, description = "Identity has never registered"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn subscribe(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(data): Json<PushSubscribe>,
) -> Result<(StatusCode, Json<PushSubscriptionResponse>)> {
    if data.endpoint.trim().is_empty() || data.keys.p256dh.trim().is_empty() || data.keys.auth.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "endpoint and keys are required".to_string(),
        });
    }

    let pool = state.db.clone();
    let request = PushSubscriptionCreateDBRequest {
        user_id: user.id,
        endpoint: data.endpoint,
        p256dh: data.keys.p256dh,
        auth: data.keys.auth,
    };

    let subscription = with_retries("upsert push subscription", || {
        let pool = pool.clone();
        let request = request.clone();
        async move {
            let mut conn = pool.acquire().await?;
            let mut subscriptions = PushSubscriptions::new(&mut conn);
            subscriptions.upsert(&request).await
        }
    })
    .await?;

    Ok((StatusCode::CREATED, Json(PushSubscriptionResponse::from(subscription))))
}

/// Remove the subscription for the given endpoint. Fire-and-forget.
#[utoipa::path(
    post,
    path = "/push/unsubscribe",
    tag = "push",
    request_body = PushUnsubscribe,
    responses(
        (status = 204, description = "No subscription remains for the endpoint"),
        (status = 404, description = "Identity has never registered"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn unsubscribe(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(data): Json<PushUnsubscribe>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut subscriptions = PushSubscriptions::new(&mut conn);

    subscriptions.delete_by_endpoint(user.id, &data.endpoint).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Send a test notification to every subscription of the caller.
///
/// Subscriptions whose endpoint is reported gone by the push service are
/// pruned along the way.
#[utoipa::path(
    post,
    path = "/push/test",
    tag = "push",
    responses(
        (status = 200, description = "Notification dispatched to live subscriptions"),
        (status = 404, description = "Identity has never registered"),
        (status = 501, description = "Push is not configured"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn send_test(State(state): State<AppState>, user: CurrentUser) -> Result<Json<serde_json::Value>> {
    let service = push_service(&state)?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut subscriptions = PushSubscriptions::new(&mut conn);

    let subs = subscriptions.list_for_user(user.id).await?;

    let payload = PushPayload {
        title: "tickerdeck".to_string(),
        body: "Push notifications are working.".to_string(),
        url: None,
    };

    let mut delivered = 0u32;
    let mut pruned = 0u32;
    for sub in &subs {
        match service.send(sub, &payload).await? {
            PushOutcome::Delivered => {
                subscriptions.mark_used(sub.id).await?;
                delivered += 1;
            }
            PushOutcome::SubscriptionGone => {
                subscriptions.delete(sub.id).await?;
                pruned += 1;
            }
        }
    }

    Ok(Json(serde_json::json!({ "delivered": delivered, "pruned": pruned })))
}
