//! Database repository for per-user notification settings.

use crate::db::{errors::Result, models::notification_settings::NotificationSettingsDBResponse};
use crate::types::{UserId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;

pub struct NotificationSettings<'c> {
    db: &'c mut PgConnection,
}

impl<'c> NotificationSettings<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn get(&mut self, user_id: UserId) -> Result<Option<NotificationSettingsDBResponse>> {
        let settings = sqlx::query_as::<_, NotificationSettingsDBResponse>(
            "SELECT * FROM notification_settings WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(settings)
    }

    /// Replace the blob wholesale.
    #[instrument(skip(self, settings), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn replace(&mut self, user_id: UserId, settings: &serde_json::Value) -> Result<NotificationSettingsDBResponse> {
        let saved = sqlx::query_as::<_, NotificationSettingsDBResponse>(
            r#"
            INSERT INTO notification_settings (user_id, settings)
            VALUES ($1, $2)
            ON CONFLICT (user_id)
            DO UPDATE SET settings = EXCLUDED.settings, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(settings)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(saved)
    }
}
