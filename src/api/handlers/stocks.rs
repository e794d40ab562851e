//! HTTP handlers for stocks, prices, and onboarding suggestions.

use axum::{
    extract::{Path, Query, State},
    response::Json,
};

use crate::{
    AppState,
    api::models::{
        predictions::PredictionResponse,
        stocks::{
            DailyPriceResponse, OnboardingStockResponse, PriceHistoryQuery, StockDetailResponse, StockResponse,
            StockSearchQuery, StockWithPriceResponse,
        },
    },
    db::{
        errors::DbError,
        handlers::{Predictions, Stocks},
    },
    errors::{Error, Result},
    types::normalize_symbol,
};

const DEFAULT_HISTORY_DAYS: i64 = 30;
const MAX_HISTORY_DAYS: i64 = 365;
const SEARCH_LIMIT: i64 = 20;

/// The dashboard always suggests exactly this many stocks during onboarding.
pub const ONBOARDING_COUNT: usize = 4;

/// Padding for when the prediction table is too thin to supply four distinct
/// candidates (fresh deployments, post-wipe environments).
pub const ONBOARDING_FALLBACK: [&str; 4] = ["AAPL", "MSFT", "GOOGL", "AMZN"];

pub(crate) fn clamp_days(days: Option<i64>) -> i64 {
    days.unwrap_or(DEFAULT_HISTORY_DAYS).clamp(1, MAX_HISTORY_DAYS)
}

/// Combine ranked candidates with the fallback list into exactly
/// [`ONBOARDING_COUNT`] unique symbols.
pub(crate) fn pick_onboarding(candidates: Vec<String>) -> Vec<String> {
    let mut picks: Vec<String> = Vec::with_capacity(ONBOARDING_COUNT);
    for symbol in candidates.into_iter().chain(ONBOARDING_FALLBACK.iter().map(|s| s.to_string())) {
        if !picks.contains(&symbol) {
            picks.push(symbol);
        }
        if picks.len() == ONBOARDING_COUNT {
            break;
        }
    }
    picks
}

/// All active stocks with their latest close.
#[utoipa::path(
    get,
    path = "/stocks",
    tag = "stocks",
    responses(
        (status = 200, description = "Active stocks", body = [StockWithPriceResponse]),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_stocks(State(state): State<AppState>) -> Result<Json<Vec<StockWithPriceResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut stocks = Stocks::new(&mut conn);

    let rows = stocks.list_active_with_latest_price().await?;

    Ok(Json(rows.into_iter().map(StockWithPriceResponse::from).collect()))
}

/// Case-insensitive search over symbol and name.
#[utoipa::path(
    get,
    path = "/stocks/search",
    tag = "stocks",
    params(StockSearchQuery),
    responses(
        (status = 200, description = "Matching stocks", body = [StockResponse]),
        (status = 400, description = "Empty query"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn search_stocks(State(state): State<AppState>, Query(query): Query<StockSearchQuery>) -> Result<Json<Vec<StockResponse>>> {
    let q = query.q.trim();
    if q.is_empty() {
        return Err(Error::BadRequest {
            message: "q is required".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut stocks = Stocks::new(&mut conn);

    let rows = stocks.search(q, SEARCH_LIMIT).await?;

    Ok(Json(rows.into_iter().map(StockResponse::from).collect()))
}

/// Detail view: stock plus latest price and prediction.
#[utoipa::path(
    get,
    path = "/stocks/{symbol}",
    tag = "stocks",
    params(("symbol" = String, Path, description = "Stock symbol")),
    responses(
        (status = 200, description = "Stock detail", body = StockDetailResponse),
        (status = 404, description = "Unknown symbol"),
    )
)]
#[tracing::instrument(skip_all, fields(symbol = %symbol))]
pub async fn get_stock(State(state): State<AppState>, Path(symbol): Path<String>) -> Result<Json<StockDetailResponse>> {
    let symbol = normalize_symbol(&symbol);

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut stocks = Stocks::new(&mut conn);

    let stock = stocks.get(&symbol).await?.ok_or_else(|| Error::NotFound {
        resource: "Stock".to_string(),
        id: symbol.clone(),
    })?;

    let latest_price = stocks.latest_price(&symbol).await?;

    let mut predictions = Predictions::new(&mut conn);
    let latest_prediction = predictions.latest_for_symbol(&symbol).await?;

    Ok(Json(StockDetailResponse {
        stock: StockResponse::from(stock),
        latest_price: latest_price.map(DailyPriceResponse::from),
        latest_prediction: latest_prediction.map(PredictionResponse::from),
    }))
}

/// Daily price history, newest first.
#[utoipa::path(
    get,
    path = "/stocks/{symbol}/prices",
    tag = "stocks",
    params(
        ("symbol" = String, Path, description = "Stock symbol"),
        PriceHistoryQuery,
    ),
    responses(
        (status = 200, description = "Daily prices, newest first", body = [DailyPriceResponse]),
        (status = 404, description = "Unknown symbol"),
    )
)]
#[tracing::instrument(skip_all, fields(symbol = %symbol))]
pub async fn get_prices(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<PriceHistoryQuery>,
) -> Result<Json<Vec<DailyPriceResponse>>> {
    let symbol = normalize_symbol(&symbol);
    let days = clamp_days(query.days);

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut stocks = Stocks::new(&mut conn);

    if stocks.get(&symbol).await?.is_none() {
        return Err(Error::NotFound {
            resource: "Stock".to_string(),
            id: symbol,
        });
    }

    let rows = stocks.prices(&symbol, days).await?;

    Ok(Json(rows.into_iter().map(DailyPriceResponse::from).collect()))
}

/// Exactly four suggested symbols for new users.
#[utoipa::path(
    get,
    path = "/onboarding/stocks",
    tag = "stocks",
    responses(
        (status = 200, description = "Exactly four watchlist suggestions", body = [OnboardingStockResponse]),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn onboarding_stocks(State(state): State<AppState>) -> Result<Json<Vec<OnboardingStockResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut predictions = Predictions::new(&mut conn);

    let candidates = predictions
        .onboarding_candidates(ONBOARDING_COUNT as i64)
        .await?
        .into_iter()
        .map(|c| c.symbol)
        .collect();

    let picks = pick_onboarding(candidates);

    Ok(Json(picks.into_iter().map(|symbol| OnboardingStockResponse { symbol }).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn onboarding_pads_from_fallback_when_candidates_are_scarce() {
        let picks = pick_onboarding(vec!["NVDA".to_string()]);
        assert_eq!(picks, vec!["NVDA", "AAPL", "MSFT", "GOOGL"]);
    }

    #[test]
    fn onboarding_returns_exactly_four_with_no_candidates() {
        let picks = pick_onboarding(vec![]);
        assert_eq!(picks.len(), ONBOARDING_COUNT);
        assert_eq!(picks, ONBOARDING_FALLBACK.map(String::from).to_vec());
    }

    #[test]
    fn onboarding_deduplicates_candidates_against_fallback() {
        // AAPL appears both as a candidate and in the fallback list
        let picks = pick_onboarding(vec!["AAPL".to_string(), "NVDA".to_string()]);
        assert_eq!(picks, vec!["AAPL", "NVDA", "MSFT", "GOOGL"]);
        assert_eq!(picks.len(), ONBOARDING_COUNT);
    }

    #[test]
    fn onboarding_truncates_surplus_candidates() {
        let picks = pick_onboarding(vec![
            "A".to_string(),
            "B".to_string(),
            "C".to_string(),
            "D".to_string(),
            "E".to_string(),
        ]);
        assert_eq!(picks, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn days_are_clamped_to_sane_bounds() {
        assert_eq!(clamp_days(None), DEFAULT_HISTORY_DAYS);
        assert_eq!(clamp_days(Some(0)), 1);
        assert_eq!(clamp_days(Some(10_000)), MAX_HISTORY_DAYS);
        assert_eq!(clamp_days(Some(90)), 90);
    }
}
