//! Database repository for watchlist entries.
//!
//! Watchlist rows are (user, symbol) pairs, so this repository exposes
//! pair-keyed operations rather than the CRUD-by-id [`Repository`] trait.
//!
//! [`Repository`]: crate::db::handlers::repository::Repository

use crate::db::{errors::Result, models::watchlist::WatchlistEntryDBResponse};
use crate::types::{UserId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Watchlist<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Watchlist<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn list_for_user(&mut self, user_id: UserId) -> Result<Vec<WatchlistEntryDBResponse>> {
        let entries = sqlx::query_as::<_, WatchlistEntryDBResponse>(
            "SELECT * FROM watchlist_entries WHERE user_id = $1 ORDER BY created_at, symbol",
        )
        .bind(user_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(entries)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn count_for_user(&mut self, user_id: UserId) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM watchlist_entries WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id), symbol = %symbol), err)]
    pub async fn contains(&mut self, user_id: UserId, symbol: &str) -> Result<bool> {
        let found: Option<i32> = sqlx::query_scalar("SELECT 1 FROM watchlist_entries WHERE user_id = $1 AND symbol = $2")
            .bind(user_id)
            .bind(symbol)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(found.is_some())
    }

    /// Idempotent add. Returns whether a row was actually inserted.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id), symbol = %symbol), err)]
    pub async fn add(&mut self, user_id: UserId, symbol: &str) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO watchlist_entries (user_id, symbol) VALUES ($1, $2) ON CONFLICT (user_id, symbol) DO NOTHING",
        )
        .bind(user_id)
        .bind(symbol)
        .execute(&mut *self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fire-and-forget remove. Returns whether a row existed.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id), symbol = %symbol), err)]
    pub async fn remove(&mut self, user_id: UserId, symbol: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM watchlist_entries WHERE user_id = $1 AND symbol = $2")
            .bind(user_id)
            .bind(symbol)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
