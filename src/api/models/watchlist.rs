//! API request/response models for the watchlist.

use crate::db::models::watchlist::WatchlistEntryDBResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WatchlistAdd {
    pub symbol: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WatchlistEntryResponse {
    pub symbol: String,
    pub created_at: DateTime<Utc>,
}

impl From<WatchlistEntryDBResponse> for WatchlistEntryResponse {
    fn from(db: WatchlistEntryDBResponse) -> Self {
        Self {
            symbol: db.symbol,
            created_at: db.created_at,
        }
    }
}
