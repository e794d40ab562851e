//! HTTP handlers for signals and prediction history.

use axum::{
    extract::{Path, Query, State},
    response::Json,
};

use crate::{
    AppState,
    api::models::predictions::{PredictionHistoryQuery, PredictionOutcomeResponse, SignalResponse},
    api::models::users::CurrentUser,
    db::{
        errors::DbError,
        handlers::{Predictions, Stocks},
    },
    errors::{Error, Result},
    types::normalize_symbol,
};

use super::stocks::clamp_days;

/// Latest signal per symbol on the caller's watchlist.
#[utoipa::path(
    get,
    path = "/signals",
    tag = "signals",
    responses(
        (status = 200, description = "Latest signal per watchlist symbol", body = [SignalResponse]),
        (status = 404, description = "Identity has never registered"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn get_signals(State(state): State<AppState>, user: CurrentUser) -> Result<Json<Vec<SignalResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut predictions = Predictions::new(&mut conn);

    let rows = predictions.latest_signals_for_user(user.id).await?;

    Ok(Json(rows.into_iter().map(SignalResponse::from).collect()))
}

/// Prediction history for a symbol with realized outcomes.
#[utoipa::path(
    get,
    path = "/stocks/{symbol}/predictions",
    tag = "signals",
    params(
        ("symbol" = String, Path, description = "Stock symbol"),
        PredictionHistoryQuery,
    ),
    responses(
        (status = 200, description = "Predictions, newest first", body = [PredictionOutcomeResponse]),
        (status = 404, description = "Unknown symbol"),
    )
)]
#[tracing::instrument(skip_all, fields(symbol = %symbol))]
pub async fn get_prediction_history(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<PredictionHistoryQuery>,
) -> Result<Json<Vec<PredictionOutcomeResponse>>> {
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

    let mut predictions = Predictions::new(&mut conn);
    let rows = predictions.history_with_outcomes(&symbol, days).await?;

    Ok(Json(rows.into_iter().map(PredictionOutcomeResponse::from).collect()))
}
