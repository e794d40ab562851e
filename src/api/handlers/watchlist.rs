//! HTTP handlers for the watchlist.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    AppState,
    api::models::{users::Tier, watchlist::{WatchlistAdd, WatchlistEntryResponse}},
    api::models::users::CurrentUser,
    db::{
        errors::DbError,
        handlers::{Stocks, Watchlist},
        retry::with_retries,
    },
    errors::{Error, Result},
    types::normalize_symbol,
};

/// The caller's watchlist. Empty list when nothing is tracked — never an
/// error.
#[utoipa::path(
    get,
    path = "/watchlist",
    tag = "watchlist",
    responses(
        (status = 200, description = "Watchlist entries", body = [WatchlistEntryResponse]),
        (status = 404, description = "Identity has never registered"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn list_watchlist(State(state): State<AppState>, user: CurrentUser) -> Result<Json<Vec<WatchlistEntryResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut watchlist = Watchlist::new(&mut conn);

    let entries = watchlist.list_for_user(user.id).await?;

    Ok(Json(entries.into_iter().map(WatchlistEntryResponse::from).collect()))
}

/// Add a symbol. Idempotent; free tier is capped.
#[utoipa::path(
    post,
    path = "/watchlist",
    tag = "watchlist",
    request_body = WatchlistAdd,
    responses(
        (status = 201, description = "Symbol added (or already present)"),
        (status = 400, description = "Missing symbol or free-tier cap reached"),
        (status = 404, description = "Unknown symbol"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn add_to_watchlist(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(data): Json<WatchlistAdd>,
) -> Result<StatusCode> {
    let symbol = normalize_symbol(&data.symbol);
    if symbol.is_empty() {
        return Err(Error::BadRequest {
            message: "symbol is required".to_string(),
        });
    }

    let pool = state.db.clone();
    let free_limit = state.config.limits.free_watchlist_limit;
    let user_id = user.id;
    let tier = user.tier;

    enum AddOutcome {
        Added,
        UnknownSymbol,
        CapReached,
    }

    let outcome = with_retries("add watchlist entry", || {
        let pool = pool.clone();
        let symbol = symbol.clone();
        async move {
            let mut tx = pool.begin().await?;

            let mut stocks = Stocks::new(&mut tx);
            if stocks.get(&symbol).await?.is_none() {
                return Ok(AddOutcome::UnknownSymbol);
            }

            let mut watchlist = Watchlist::new(&mut tx);

            // Re-adding a tracked symbol is a no-op, never a cap violation
            if watchlist.contains(user_id, &symbol).await? {
                return Ok(AddOutcome::Added);
            }

            if tier == Tier::Free && watchlist.count_for_user(user_id).await? >= free_limit {
                return Ok(AddOutcome::CapReached);
            }

            watchlist.add(user_id, &symbol).await?;
            tx.commit().await?;
            Ok(AddOutcome::Added)
        }
    })
    .await?;

    match outcome {
        AddOutcome::Added => Ok(StatusCode::CREATED),
        AddOutcome::UnknownSymbol => Err(Error::NotFound {
            resource: "Stock".to_string(),
            id: symbol,
        }),
        AddOutcome::CapReached => Err(Error::BadRequest {
            message: format!("free tier is limited to {free_limit} watchlist symbols"),
        }),
    }
}

/// Remove a symbol. Fire-and-forget: removing an absent symbol still
/// succeeds.
#[utoipa::path(
    delete,
    path = "/watchlist/{symbol}",
    tag = "watchlist",
    params(("symbol" = String, Path, description = "Stock symbol")),
    responses(
        (status = 204, description = "Symbol no longer on the watchlist"),
        (status = 404, description = "Identity has never registered"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id, symbol = %symbol))]
pub async fn remove_from_watchlist(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(symbol): Path<String>,
) -> Result<StatusCode> {
    let symbol = normalize_symbol(&symbol);

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut watchlist = Watchlist::new(&mut conn);

    watchlist.remove(user.id, &symbol).await?;

    Ok(StatusCode::NO_CONTENT)
}
