//! Database repository for users.

use crate::api::models::users::Tier;
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
};
use crate::types::{UserId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;

/// Filter for listing users
#[derive(Debug, Clone)]
pub struct UserFilter {
    pub skip: i64,
    pub limit: i64,
}

impl UserFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }
}

pub struct Users<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type UpdateRequest = UserUpdateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;
    type Filter = UserFilter;

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let user = sqlx::query_as::<_, UserDBResponse>(
            r#"
            INSERT INTO users (id, registration_type, referral_code, referred_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(&request.registration_type)
        .bind(&request.referral_code)
        .bind(request.referred_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as::<_, UserDBResponse>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let users = sqlx::query_as::<_, UserDBResponse>("SELECT * FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2")
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(users)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let user = sqlx::query_as::<_, UserDBResponse>(
            r#"
            UPDATE users SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                registration_type = COALESCE($4, registration_type),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.username)
        .bind(&request.email)
        .bind(&request.registration_type)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(user)
    }
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Idempotent registration: insert the row if the ID is new, otherwise
    /// leave the existing row untouched. Returns the row plus whether this
    /// call created it.
    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.id)), err)]
    pub async fn register(&mut self, request: &UserCreateDBRequest) -> Result<(UserDBResponse, bool)> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO users (id, registration_type, referral_code, referred_by)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(request.id)
        .bind(&request.registration_type)
        .bind(&request.referral_code)
        .bind(request.referred_by)
        .execute(&mut *self.db)
        .await?;

        let user = sqlx::query_as::<_, UserDBResponse>("SELECT * FROM users WHERE id = $1")
            .bind(request.id)
            .fetch_one(&mut *self.db)
            .await?;

        Ok((user, inserted.rows_affected() > 0))
    }

    #[instrument(skip(self, code), err)]
    pub async fn get_by_referral_code(&mut self, code: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, UserDBResponse>("SELECT * FROM users WHERE referral_code = $1")
            .bind(code)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self, provider_id), err)]
    pub async fn get_by_payment_provider_id(&mut self, provider_id: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, UserDBResponse>("SELECT * FROM users WHERE payment_provider_id = $1")
            .bind(provider_id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    /// Move a user to the given tier. No-op (returns false) when the user is
    /// already there, which is what makes webhook replays idempotent.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id), tier = ?tier), err)]
    pub async fn set_tier(&mut self, id: UserId, tier: Tier) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET tier = $2, updated_at = NOW() WHERE id = $1 AND tier IS DISTINCT FROM $2")
            .bind(id)
            .bind(&tier)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, provider_id), fields(user_id = %abbrev_uuid(&id)), err)]
    pub async fn set_payment_provider_id(&mut self, id: UserId, provider_id: &str) -> Result<()> {
        sqlx::query("UPDATE users SET payment_provider_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(provider_id)
            .execute(&mut *self.db)
            .await?;

        Ok(())
    }

    /// How many users registered with this user's referral code.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    pub async fn count_referrals(&mut self, id: UserId) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE referred_by = $1")
            .bind(id)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }
}
