//! Database repository for invite codes.

use crate::db::{errors::Result, models::invites::InviteCodeDBResponse};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Invites<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Invites<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, code), err)]
    pub async fn get(&mut self, code: &str) -> Result<Option<InviteCodeDBResponse>> {
        let invite = sqlx::query_as::<_, InviteCodeDBResponse>("SELECT * FROM invite_codes WHERE code = $1")
            .bind(code)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(invite)
    }

    /// Atomically consume one use of the code. Returns false when the code
    /// doesn't exist or is exhausted.
    #[instrument(skip(self, code), err)]
    pub async fn consume(&mut self, code: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE invite_codes SET uses = uses + 1 WHERE code = $1 AND uses < max_uses")
            .bind(code)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, code), err)]
    pub async fn create(&mut self, code: &str, max_uses: i32) -> Result<InviteCodeDBResponse> {
        let invite = sqlx::query_as::<_, InviteCodeDBResponse>(
            "INSERT INTO invite_codes (code, max_uses) VALUES ($1, $2) RETURNING *",
        )
        .bind(code)
        .bind(max_uses)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(invite)
    }
}
