//! API request/response models for predictions and signals.

use crate::db::models::predictions::{LatestSignalDBResponse, PredictionDBResponse, PredictionOutcomeDBResponse};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Model-generated trading signal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "prediction_signal", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PredictionResponse {
    pub symbol: String,
    pub date: NaiveDate,
    pub signal: Signal,
    pub confidence: f64,
    #[schema(value_type = String)]
    pub predicted_close: Decimal,
    pub horizon_days: i32,
}

/// A historical prediction with its realized outcome where the horizon has
/// elapsed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PredictionOutcomeResponse {
    pub symbol: String,
    pub date: NaiveDate,
    pub signal: Signal,
    pub confidence: f64,
    #[schema(value_type = String)]
    pub predicted_close: Decimal,
    pub horizon_days: i32,
    /// Close on the day the horizon elapsed; absent while the horizon is open
    #[schema(value_type = Option<String>)]
    pub realized_close: Option<Decimal>,
}

/// Latest signal for one watchlist symbol.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignalResponse {
    pub symbol: String,
    pub date: NaiveDate,
    pub signal: Signal,
    pub confidence: f64,
    #[schema(value_type = Option<String>)]
    pub latest_close: Option<Decimal>,
}

/// Query parameters for prediction history
#[derive(Debug, Deserialize, IntoParams)]
pub struct PredictionHistoryQuery {
    /// How many predictions to return (default 30, max 365)
    pub days: Option<i64>,
}

impl From<PredictionDBResponse> for PredictionResponse {
    fn from(db: PredictionDBResponse) -> Self {
        Self {
            symbol: db.symbol,
            date: db.date,
            signal: db.signal,
            confidence: db.confidence,
            predicted_close: db.predicted_close,
            horizon_days: db.horizon_days,
        }
    }
}

impl From<PredictionOutcomeDBResponse> for PredictionOutcomeResponse {
    fn from(db: PredictionOutcomeDBResponse) -> Self {
        Self {
            symbol: db.symbol,
            date: db.date,
            signal: db.signal,
            confidence: db.confidence,
            predicted_close: db.predicted_close,
            horizon_days: db.horizon_days,
            realized_close: db.realized_close,
        }
    }
}

impl From<LatestSignalDBResponse> for SignalResponse {
    fn from(db: LatestSignalDBResponse) -> Self {
        Self {
            symbol: db.symbol,
            date: db.date,
            signal: db.signal,
            confidence: db.confidence,
            latest_close: db.latest_close,
        }
    }
}
