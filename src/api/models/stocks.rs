//! API request/response models for stocks and prices.

use crate::api::models::predictions::PredictionResponse;
use crate::db::models::stocks::{DailyPriceDBResponse, StockDBResponse, StockWithPriceDBResponse};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StockResponse {
    pub symbol: String,
    pub name: String,
    pub sector: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StockWithPriceResponse {
    pub symbol: String,
    pub name: String,
    pub sector: Option<String>,
    #[schema(value_type = Option<String>)]
    pub latest_close: Option<Decimal>,
    pub latest_price_date: Option<NaiveDate>,
}

/// Detail view: the stock joined with its latest price and prediction.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StockDetailResponse {
    #[serde(flatten)]
    pub stock: StockResponse,
    pub latest_price: Option<DailyPriceResponse>,
    pub latest_prediction: Option<PredictionResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DailyPriceResponse {
    pub date: NaiveDate,
    #[schema(value_type = String)]
    pub open: Decimal,
    #[schema(value_type = String)]
    pub high: Decimal,
    #[schema(value_type = String)]
    pub low: Decimal,
    #[schema(value_type = String)]
    pub close: Decimal,
    pub volume: i64,
}

/// An onboarding watchlist suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OnboardingStockResponse {
    pub symbol: String,
}

/// Query parameters for price history
#[derive(Debug, Deserialize, IntoParams)]
pub struct PriceHistoryQuery {
    /// How many trading days to return (default 30, max 365)
    pub days: Option<i64>,
}

/// Query parameters for stock search
#[derive(Debug, Deserialize, IntoParams)]
pub struct StockSearchQuery {
    /// Substring matched case-insensitively against symbol and name
    pub q: String,
}

impl From<StockDBResponse> for StockResponse {
    fn from(db: StockDBResponse) -> Self {
        Self {
            symbol: db.symbol,
            name: db.name,
            sector: db.sector,
        }
    }
}

impl From<StockWithPriceDBResponse> for StockWithPriceResponse {
    fn from(db: StockWithPriceDBResponse) -> Self {
        Self {
            symbol: db.symbol,
            name: db.name,
            sector: db.sector,
            latest_close: db.latest_close,
            latest_price_date: db.latest_price_date,
        }
    }
}

impl From<DailyPriceDBResponse> for DailyPriceResponse {
    fn from(db: DailyPriceDBResponse) -> Self {
        Self {
            date: db.date,
            open: db.open,
            high: db.high,
            low: db.low,
            close: db.close,
            volume: db.volume,
        }
    }
}
