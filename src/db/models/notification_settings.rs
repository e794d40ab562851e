//! Database models for per-user notification settings.

use crate::types::UserId;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// The stored settings blob. Replaced wholesale on save; server-side defaults
/// are merged over it on read (see the notification-settings handler).
#[derive(Debug, Clone, FromRow)]
pub struct NotificationSettingsDBResponse {
    pub user_id: UserId,
    pub settings: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}
