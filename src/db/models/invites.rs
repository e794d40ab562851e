//! Database models for invite codes.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct InviteCodeDBResponse {
    pub code: String,
    pub max_uses: i32,
    pub uses: i32,
    pub created_at: DateTime<Utc>,
}

impl InviteCodeDBResponse {
    pub fn is_exhausted(&self) -> bool {
        self.uses >= self.max_uses
    }
}
