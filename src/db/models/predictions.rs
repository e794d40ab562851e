//! Database models for model predictions.

use crate::api::models::predictions::Signal;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct PredictionDBResponse {
    pub symbol: String,
    pub date: NaiveDate,
    pub signal: Signal,
    pub confidence: f64,
    pub predicted_close: Decimal,
    pub horizon_days: i32,
}

/// A historical prediction joined with the close actually realized once the
/// horizon elapsed. `realized_close` is NULL while the horizon is still open.
#[derive(Debug, Clone, FromRow)]
pub struct PredictionOutcomeDBResponse {
    pub symbol: String,
    pub date: NaiveDate,
    pub signal: Signal,
    pub confidence: f64,
    pub predicted_close: Decimal,
    pub horizon_days: i32,
    pub realized_close: Option<Decimal>,
}

/// Latest signal for one watchlist symbol.
#[derive(Debug, Clone, FromRow)]
pub struct LatestSignalDBResponse {
    pub symbol: String,
    pub date: NaiveDate,
    pub signal: Signal,
    pub confidence: f64,
    pub latest_close: Option<Decimal>,
}

/// Candidate row for onboarding suggestions: most recent prediction per
/// symbol, ranked by confidence.
#[derive(Debug, Clone, FromRow)]
pub struct OnboardingCandidateDBResponse {
    pub symbol: String,
    pub confidence: f64,
}
