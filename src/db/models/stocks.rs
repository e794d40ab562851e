//! Database models for stocks and daily prices.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct StockDBResponse {
    pub symbol: String,
    pub name: String,
    pub sector: Option<String>,
    pub active: bool,
}

/// A stock joined with its most recent close, as listed on the dashboard.
#[derive(Debug, Clone, FromRow)]
pub struct StockWithPriceDBResponse {
    pub symbol: String,
    pub name: String,
    pub sector: Option<String>,
    pub latest_close: Option<Decimal>,
    pub latest_price_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DailyPriceDBResponse {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: i64,
}
