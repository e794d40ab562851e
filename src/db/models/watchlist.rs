//! Database models for watchlist entries.

use crate::types::UserId;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct WatchlistEntryDBResponse {
    pub user_id: UserId,
    pub symbol: String,
    pub created_at: DateTime<Utc>,
}
