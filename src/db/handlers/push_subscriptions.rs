//! Database repository for web-push subscriptions.

use crate::db::{
    errors::Result,
    models::push_subscriptions::{PushSubscriptionCreateDBRequest, PushSubscriptionDBResponse},
};
use crate::types::{PushSubscriptionId, UserId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

pub struct PushSubscriptions<'c> {
    db: &'c mut PgConnection,
}

impl<'c> PushSubscriptions<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Upsert on (user, endpoint): re-subscribing refreshes the keys instead
    /// of stacking duplicate rows.
    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id)), err)]
    pub async fn upsert(&mut self, request: &PushSubscriptionCreateDBRequest) -> Result<PushSubscriptionDBResponse> {
        let subscription = sqlx::query_as::<_, PushSubscriptionDBResponse>(
            r#"
            INSERT INTO push_subscriptions (id, user_id, endpoint, p256dh, auth)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, endpoint)
            DO UPDATE SET p256dh = EXCLUDED.p256dh, auth = EXCLUDED.auth
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.user_id)
        .bind(&request.endpoint)
        .bind(&request.p256dh)
        .bind(&request.auth)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(subscription)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn list_for_user(&mut self, user_id: UserId) -> Result<Vec<PushSubscriptionDBResponse>> {
        let subscriptions = sqlx::query_as::<_, PushSubscriptionDBResponse>(
            "SELECT * FROM push_subscriptions WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(subscriptions)
    }

    /// Remove the subscription for this (user, endpoint) pair. Returns
    /// whether a row existed.
    #[instrument(skip(self, endpoint), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn delete_by_endpoint(&mut self, user_id: UserId, endpoint: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM push_subscriptions WHERE user_id = $1 AND endpoint = $2")
            .bind(user_id)
            .bind(endpoint)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Prune a subscription the push service reported as gone.
    #[instrument(skip(self), fields(subscription_id = %abbrev_uuid(&id)), err)]
    pub async fn delete(&mut self, id: PushSubscriptionId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM push_subscriptions WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(subscription_id = %abbrev_uuid(&id)), err)]
    pub async fn mark_used(&mut self, id: PushSubscriptionId) -> Result<()> {
        sqlx::query("UPDATE push_subscriptions SET last_used_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(())
    }
}
