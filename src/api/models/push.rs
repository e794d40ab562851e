//! API request/response models for push subscriptions.

use crate::db::models::push_subscriptions::PushSubscriptionDBResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Encryption keys from the browser's `PushSubscription.toJSON()`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PushKeys {
    pub p256dh: String,
    pub auth: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PushSubscribe {
    pub endpoint: String,
    pub keys: PushKeys,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PushUnsubscribe {
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PushSubscriptionResponse {
    pub endpoint: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VapidKeyResponse {
    pub public_key: String,
}

impl From<PushSubscriptionDBResponse> for PushSubscriptionResponse {
    fn from(db: PushSubscriptionDBResponse) -> Self {
        Self {
            endpoint: db.endpoint,
            created_at: db.created_at,
            last_used_at: db.last_used_at,
        }
    }
}
