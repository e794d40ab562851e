//! Database repository for model predictions and derived signals.

use crate::api::models::predictions::Signal;
use crate::db::{
    errors::Result,
    models::predictions::{
        LatestSignalDBResponse, OnboardingCandidateDBResponse, PredictionDBResponse, PredictionOutcomeDBResponse,
    },
};
use crate::types::{UserId, abbrev_uuid};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgConnection;
use tracing::instrument;

pub struct Predictions<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Predictions<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn latest_for_symbol(&mut self, symbol: &str) -> Result<Option<PredictionDBResponse>> {
        let prediction = sqlx::query_as::<_, PredictionDBResponse>(
            "SELECT * FROM predictions WHERE symbol = $1 ORDER BY date DESC LIMIT 1",
        )
        .bind(symbol)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(prediction)
    }

    /// Prediction history for a symbol, newest first, joined with the close
    /// realized once each prediction's horizon elapsed.
    #[instrument(skip(self), fields(symbol = %symbol, limit), err)]
    pub async fn history_with_outcomes(&mut self, symbol: &str, limit: i64) -> Result<Vec<PredictionOutcomeDBResponse>> {
        let rows = sqlx::query_as::<_, PredictionOutcomeDBResponse>(
            r#"
            SELECT p.symbol, p.date, p.signal, p.confidence, p.predicted_close, p.horizon_days,
                   r.close AS realized_close
            FROM predictions p
            LEFT JOIN daily_prices r
              ON r.symbol = p.symbol AND r.date = p.date + p.horizon_days
            WHERE p.symbol = $1
            ORDER BY p.date DESC
            LIMIT $2
            "#,
        )
        .bind(symbol)
        .bind(limit)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows)
    }

    /// Latest signal per symbol on the user's watchlist, with the latest
    /// close for context.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn latest_signals_for_user(&mut self, user_id: UserId) -> Result<Vec<LatestSignalDBResponse>> {
        let rows = sqlx::query_as::<_, LatestSignalDBResponse>(
            r#"
            SELECT p.symbol, p.date, p.signal, p.confidence, c.close AS latest_close
            FROM watchlist_entries w
            JOIN LATERAL (
                SELECT symbol, date, signal, confidence FROM predictions pr
                WHERE pr.symbol = w.symbol
                ORDER BY date DESC
                LIMIT 1
            ) p ON TRUE
            LEFT JOIN LATERAL (
                SELECT close FROM daily_prices dp
                WHERE dp.symbol = w.symbol
                ORDER BY date DESC
                LIMIT 1
            ) c ON TRUE
            WHERE w.user_id = $1
            ORDER BY p.symbol
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows)
    }

    /// Onboarding candidates: symbols whose most recent prediction is a buy,
    /// ranked by that prediction's confidence.
    #[instrument(skip(self), err)]
    pub async fn onboarding_candidates(&mut self, limit: i64) -> Result<Vec<OnboardingCandidateDBResponse>> {
        let rows = sqlx::query_as::<_, OnboardingCandidateDBResponse>(
            r#"
            SELECT symbol, confidence FROM (
                SELECT DISTINCT ON (symbol) symbol, signal, confidence
                FROM predictions
                ORDER BY symbol, date DESC
            ) latest
            WHERE signal = 'buy'
            ORDER BY confidence DESC, symbol
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows)
    }

    /// Insert a prediction row (test seeding; production rows come from the
    /// ingestion job).
    #[instrument(skip_all, fields(symbol = %symbol, date = %date), err)]
    pub async fn insert(
        &mut self,
        symbol: &str,
        date: NaiveDate,
        signal: Signal,
        confidence: f64,
        predicted_close: Decimal,
        horizon_days: i32,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO predictions (symbol, date, signal, confidence, predicted_close, horizon_days)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(symbol)
        .bind(date)
        .bind(signal)
        .bind(confidence)
        .bind(predicted_close)
        .bind(horizon_days)
        .execute(&mut *self.db)
        .await?;

        Ok(())
    }
}
