//! Database models for web-push subscriptions.

use crate::types::{PushSubscriptionId, UserId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database request for upserting a push subscription
#[derive(Debug, Clone)]
pub struct PushSubscriptionCreateDBRequest {
    pub user_id: UserId,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct PushSubscriptionDBResponse {
    pub id: PushSubscriptionId,
    pub user_id: UserId,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}
