//! Database repository for stocks and daily prices.
//!
//! Stock and price rows are written by the external ingestion job; the
//! application only reads them (inserts exist for test seeding).

use crate::db::{
    errors::Result,
    models::stocks::{DailyPriceDBResponse, StockDBResponse, StockWithPriceDBResponse},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgConnection;
use tracing::instrument;

pub struct Stocks<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Stocks<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn get(&mut self, symbol: &str) -> Result<Option<StockDBResponse>> {
        let stock = sqlx::query_as::<_, StockDBResponse>("SELECT * FROM stocks WHERE symbol = $1")
            .bind(symbol)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(stock)
    }

    /// All active stocks with their most recent close.
    #[instrument(skip(self), err)]
    pub async fn list_active_with_latest_price(&mut self) -> Result<Vec<StockWithPriceDBResponse>> {
        let stocks = sqlx::query_as::<_, StockWithPriceDBResponse>(
            r#"
            SELECT s.symbol, s.name, s.sector, p.close AS latest_close, p.date AS latest_price_date
            FROM stocks s
            LEFT JOIN LATERAL (
                SELECT close, date FROM daily_prices dp
                WHERE dp.symbol = s.symbol
                ORDER BY date DESC
                LIMIT 1
            ) p ON TRUE
            WHERE s.active
            ORDER BY s.symbol
            "#,
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(stocks)
    }

    /// Case-insensitive substring search over symbol and name.
    #[instrument(skip(self, query), err)]
    pub async fn search(&mut self, query: &str, limit: i64) -> Result<Vec<StockDBResponse>> {
        let pattern = format!("%{}%", query.replace('%', "\\%").replace('_', "\\_"));
        let stocks = sqlx::query_as::<_, StockDBResponse>(
            r#"
            SELECT * FROM stocks
            WHERE active AND (symbol ILIKE $1 OR name ILIKE $1)
            ORDER BY symbol
            LIMIT $2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(stocks)
    }

    /// Daily closes for a symbol, newest first.
    #[instrument(skip(self), fields(symbol = %symbol, days), err)]
    pub async fn prices(&mut self, symbol: &str, days: i64) -> Result<Vec<DailyPriceDBResponse>> {
        let prices = sqlx::query_as::<_, DailyPriceDBResponse>(
            "SELECT * FROM daily_prices WHERE symbol = $1 ORDER BY date DESC LIMIT $2",
        )
        .bind(symbol)
        .bind(days)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(prices)
    }

    #[instrument(skip(self), err)]
    pub async fn latest_price(&mut self, symbol: &str) -> Result<Option<DailyPriceDBResponse>> {
        let price = sqlx::query_as::<_, DailyPriceDBResponse>(
            "SELECT * FROM daily_prices WHERE symbol = $1 ORDER BY date DESC LIMIT 1",
        )
        .bind(symbol)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(price)
    }

    /// Insert a stock row. Production rows come from the ingestion job; this
    /// exists for seeding in tests.
    #[instrument(skip_all, fields(symbol = %symbol), err)]
    pub async fn insert(&mut self, symbol: &str, name: &str, sector: Option<&str>) -> Result<StockDBResponse> {
        let stock = sqlx::query_as::<_, StockDBResponse>(
            "INSERT INTO stocks (symbol, name, sector) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(symbol)
        .bind(name)
        .bind(sector)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(stock)
    }

    /// Insert a daily price row (test seeding, see [`Self::insert`]).
    #[instrument(skip_all, fields(symbol = %symbol, date = %date), err)]
    pub async fn insert_price(&mut self, symbol: &str, date: NaiveDate, close: Decimal, volume: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO daily_prices (symbol, date, open, high, low, close, volume)
            VALUES ($1, $2, $3, $3, $3, $3, $4)
            "#,
        )
        .bind(symbol)
        .bind(date)
        .bind(close)
        .bind(volume)
        .execute(&mut *self.db)
        .await?;

        Ok(())
    }
}
