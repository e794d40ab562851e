//! API-level integration tests.
//!
//! Each test gets its own migrated database from `#[sqlx::test]` and drives
//! the full router through `axum_test::TestServer`.

use axum::http::StatusCode;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::models::predictions::Signal;
use crate::auth::USER_ID_HEADER;
use crate::test_utils::*;

fn day(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

// --- Registration ---

#[sqlx::test]
async fn registering_twice_with_same_id_is_idempotent(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;
    let user_id = Uuid::new_v4();

    let first = server.post("/api/users/register").json(&json!({ "user_id": user_id })).await;
    assert_eq!(first.status_code(), StatusCode::CREATED);
    let first: Value = first.json();
    assert_eq!(first["created"], json!(true));
    assert_eq!(first["registration_type"], json!("anonymous"));
    assert_eq!(first["tier"], json!("free"));

    let second = server.post("/api/users/register").json(&json!({ "user_id": user_id })).await;
    assert_eq!(second.status_code(), StatusCode::CREATED);
    let second: Value = second.json();
    assert_eq!(second["created"], json!(false));
    assert_eq!(second["id"], first["id"]);
    // replay kept the original referral code
    assert_eq!(second["referral_code"], first["referral_code"]);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(&pool).await.unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test]
async fn registration_links_referrer(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;
    let referrer = create_test_user(&pool).await;

    let user_id = Uuid::new_v4();
    let response = server
        .post("/api/users/register")
        .json(&json!({ "user_id": user_id, "referral_code": referrer.referral_code }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let referral = server
        .get("/api/users/me/referral")
        .add_header(USER_ID_HEADER, referrer.id.to_string())
        .await;
    assert_eq!(referral.status_code(), StatusCode::OK);
    let referral: Value = referral.json();
    assert_eq!(referral["referred_count"], json!(1));
}

#[sqlx::test]
async fn invite_gating_blocks_registration_without_valid_code(pool: PgPool) {
    let mut config = create_test_config();
    config.invites.required = true;
    let server = create_test_app_with(pool.clone(), config).await;

    seed_invite(&pool, "WELCOME1", 1).await;

    // No code at all
    let response = server.post("/api/users/register").json(&json!({ "user_id": Uuid::new_v4() })).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // Valid code works
    let gated_id = Uuid::new_v4();
    let response = server
        .post("/api/users/register")
        .json(&json!({ "user_id": gated_id, "invite_code": "WELCOME1" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    // Code is now exhausted (max_uses = 1)
    let response = server
        .post("/api/users/register")
        .json(&json!({ "user_id": Uuid::new_v4(), "invite_code": "WELCOME1" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // Replays of an existing registration skip the gate entirely
    let response = server.post("/api/users/register").json(&json!({ "user_id": gated_id })).await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
}

// --- Profiles ---

#[sqlx::test]
async fn unregistered_identity_gets_404_on_profile(pool: PgPool) {
    let server = create_test_app(pool).await;

    let response = server
        .get("/api/users/me")
        .add_header(USER_ID_HEADER, Uuid::new_v4().to_string())
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[sqlx::test]
async fn missing_identity_header_is_unauthorized(pool: PgPool) {
    let server = create_test_app(pool).await;

    let response = server.get("/api/users/me").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test]
async fn profile_update_upgrades_to_explicit_account(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;
    let user = create_test_user(&pool).await;

    let response = server
        .patch("/api/users/me")
        .add_header(USER_ID_HEADER, user.id.to_string())
        .json(&json!({ "username": "trader_jane", "email": "jane@example.com" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["registration_type"], json!("explicit"));
    assert_eq!(body["username"], json!("trader_jane"));

    // Username collisions surface as conflicts
    let other = create_test_user(&pool).await;
    let response = server
        .patch("/api/users/me")
        .add_header(USER_ID_HEADER, other.id.to_string())
        .json(&json!({ "username": "trader_jane", "email": "other@example.com" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

// --- Watchlist ---

#[sqlx::test]
async fn empty_watchlist_reads_as_empty_list(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;
    let user = create_test_user(&pool).await;

    let response = server
        .get("/api/watchlist")
        .add_header(USER_ID_HEADER, user.id.to_string())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body, json!([]));
}

#[sqlx::test]
async fn watchlist_add_normalizes_and_validates_symbols(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;
    let user = create_test_user(&pool).await;
    seed_stock(&pool, "AAPL", "Apple Inc.").await;

    let response = server
        .post("/api/watchlist")
        .add_header(USER_ID_HEADER, user.id.to_string())
        .json(&json!({ "symbol": " aapl " }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    // Unknown symbols are rejected
    let response = server
        .post("/api/watchlist")
        .add_header(USER_ID_HEADER, user.id.to_string())
        .json(&json!({ "symbol": "ZZZZ" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = server
        .get("/api/watchlist")
        .add_header(USER_ID_HEADER, user.id.to_string())
        .await;
    let body: Value = response.json();
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["symbol"], json!("AAPL"));
}

#[sqlx::test]
async fn free_tier_watchlist_is_capped(pool: PgPool) {
    let mut config = create_test_config();
    config.limits.free_watchlist_limit = 2;
    let server = create_test_app_with(pool.clone(), config).await;
    let user = create_test_user(&pool).await;

    for symbol in ["AAPL", "MSFT", "NVDA"] {
        seed_stock(&pool, symbol, symbol).await;
    }

    for symbol in ["AAPL", "MSFT"] {
        let response = server
            .post("/api/watchlist")
            .add_header(USER_ID_HEADER, user.id.to_string())
            .json(&json!({ "symbol": symbol }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
    }

    let response = server
        .post("/api/watchlist")
        .add_header(USER_ID_HEADER, user.id.to_string())
        .json(&json!({ "symbol": "NVDA" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // Re-adding a tracked symbol is idempotent, not a cap violation
    let response = server
        .post("/api/watchlist")
        .add_header(USER_ID_HEADER, user.id.to_string())
        .json(&json!({ "symbol": "AAPL" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let response = server
        .delete("/api/watchlist/MSFT")
        .add_header(USER_ID_HEADER, user.id.to_string())
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = server
        .post("/api/watchlist")
        .add_header(USER_ID_HEADER, user.id.to_string())
        .json(&json!({ "symbol": "NVDA" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
}

// --- Market data ---

#[sqlx::test]
async fn stock_detail_joins_latest_price_and_prediction(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;
    seed_stock(&pool, "AAPL", "Apple Inc.").await;
    seed_price(&pool, "AAPL", day("2026-08-03"), Decimal::new(21050, 2)).await;
    seed_price(&pool, "AAPL", day("2026-08-04"), Decimal::new(21275, 2)).await;
    seed_prediction(&pool, "AAPL", day("2026-08-04"), Signal::Buy, 0.82).await;

    let response = server.get("/api/stocks/AAPL").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["symbol"], json!("AAPL"));
    assert_eq!(body["latest_price"]["date"], json!("2026-08-04"));
    assert_eq!(body["latest_prediction"]["signal"], json!("buy"));

    let response = server.get("/api/stocks/ZZZZ").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[sqlx::test]
async fn price_history_is_newest_first_and_clamped(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;
    seed_stock(&pool, "AAPL", "Apple Inc.").await;
    for (date, close) in [("2026-08-01", 20900), ("2026-08-02", 21000), ("2026-08-03", 21100)] {
        seed_price(&pool, "AAPL", day(date), Decimal::new(close, 2)).await;
    }

    let response = server.get("/api/stocks/AAPL/prices?days=2").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["date"], json!("2026-08-03"));
    assert_eq!(rows[1]["date"], json!("2026-08-02"));
}

#[sqlx::test]
async fn signals_cover_exactly_the_watchlist(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;
    let user = create_test_user(&pool).await;

    for symbol in ["AAPL", "MSFT"] {
        seed_stock(&pool, symbol, symbol).await;
        seed_prediction(&pool, symbol, day("2026-08-04"), Signal::Buy, 0.7).await;
    }
    // MSFT is predicted but not watched
    server
        .post("/api/watchlist")
        .add_header(USER_ID_HEADER, user.id.to_string())
        .json(&json!({ "symbol": "AAPL" }))
        .await;

    let response = server
        .get("/api/signals")
        .add_header(USER_ID_HEADER, user.id.to_string())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["symbol"], json!("AAPL"));
    assert_eq!(rows[0]["signal"], json!("buy"));
}

#[sqlx::test]
async fn prediction_history_includes_realized_outcomes(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;
    seed_stock(&pool, "AAPL", "Apple Inc.").await;
    // Prediction on the 3rd with a 1-day horizon; the 4th's close realizes it
    seed_prediction(&pool, "AAPL", day("2026-08-03"), Signal::Buy, 0.9).await;
    seed_prediction(&pool, "AAPL", day("2026-08-04"), Signal::Hold, 0.5).await;
    seed_price(&pool, "AAPL", day("2026-08-04"), Decimal::new(21275, 2)).await;

    let response = server.get("/api/stocks/AAPL/predictions").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    // newest first: the 4th's horizon is still open
    assert_eq!(rows[0]["date"], json!("2026-08-04"));
    assert_eq!(rows[0]["realized_close"], Value::Null);
    assert_eq!(rows[1]["date"], json!("2026-08-03"));
    let realized: f64 = rows[1]["realized_close"].as_str().unwrap().parse().unwrap();
    assert!((realized - 212.75).abs() < 1e-9);
}

#[sqlx::test]
async fn onboarding_returns_exactly_four_entries(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;

    // Only one real candidate exists; the rest pad from the fallback list
    seed_stock(&pool, "NVDA", "NVIDIA Corp.").await;
    seed_prediction(&pool, "NVDA", day("2026-08-04"), Signal::Buy, 0.95).await;

    let response = server.get("/api/onboarding/stocks").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["symbol"], json!("NVDA"));
}

#[sqlx::test]
async fn onboarding_with_no_data_falls_back_entirely(pool: PgPool) {
    let server = create_test_app(pool).await;

    let response = server.get("/api/onboarding/stocks").await;
    let body: Value = response.json();
    let symbols: Vec<&str> = body.as_array().unwrap().iter().map(|r| r["symbol"].as_str().unwrap()).collect();
    assert_eq!(symbols, vec!["AAPL", "MSFT", "GOOGL", "AMZN"]);
}

// --- Push subscriptions ---

#[sqlx::test]
async fn subscribe_then_unsubscribe_leaves_zero_rows(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;
    let user = create_test_user(&pool).await;

    let subscription = json!({
        "endpoint": "https://push.example/sub/abc",
        "keys": { "p256dh": "p256dh-key", "auth": "auth-secret" }
    });

    let response = server
        .post("/api/push/subscribe")
        .add_header(USER_ID_HEADER, user.id.to_string())
        .json(&subscription)
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    // Re-subscribing the same endpoint upserts rather than duplicating
    let response = server
        .post("/api/push/subscribe")
        .add_header(USER_ID_HEADER, user.id.to_string())
        .json(&subscription)
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM push_subscriptions WHERE user_id = $1")
        .bind(user.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    let response = server
        .post("/api/push/unsubscribe")
        .add_header(USER_ID_HEADER, user.id.to_string())
        .json(&json!({ "endpoint": "https://push.example/sub/abc" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM push_subscriptions WHERE user_id = $1")
        .bind(user.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test]
async fn push_endpoints_answer_501_when_unconfigured(pool: PgPool) {
    // Default test config has no push section
    let server = create_test_app(pool.clone()).await;

    let response = server.get("/api/push/key").await;
    assert_eq!(response.status_code(), StatusCode::NOT_IMPLEMENTED);
}

// --- Notification settings ---

#[sqlx::test]
async fn settings_read_merges_defaults_and_save_replaces_wholesale(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;
    let user = create_test_user(&pool).await;

    let response = server
        .get("/api/notification-settings")
        .add_header(USER_ID_HEADER, user.id.to_string())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["settings"]["signals_enabled"], json!(true));

    let response = server
        .put("/api/notification-settings")
        .add_header(USER_ID_HEADER, user.id.to_string())
        .json(&json!({ "signals_enabled": false }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["settings"]["signals_enabled"], json!(false));
    // keys the client didn't save still read through from defaults
    assert_eq!(body["settings"]["min_confidence"], json!(0.6));

    // the stored blob holds only what was saved
    let stored: serde_json::Value = sqlx::query_scalar("SELECT settings FROM notification_settings WHERE user_id = $1")
        .bind(user.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, json!({ "signals_enabled": false }));
}

// --- Billing ---

#[sqlx::test]
async fn webhook_tier_transitions_are_idempotent(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;
    let user = create_test_user(&pool).await;

    let upgrade = json!({
        "type": "checkout.completed",
        "user_id": user.id.to_string(),
        "customer_id": "cus_test_1"
    });

    for _ in 0..2 {
        let response = server.post("/api/webhooks/payments").json(&upgrade).await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    let status = server
        .get("/api/billing/status")
        .add_header(USER_ID_HEADER, user.id.to_string())
        .await;
    let status: Value = status.json();
    assert_eq!(status["tier"], json!("pro"));
    assert_eq!(status["has_customer"], json!(true));

    let cancel = json!({ "type": "subscription.canceled", "customer_id": "cus_test_1" });
    for _ in 0..2 {
        let response = server.post("/api/webhooks/payments").json(&cancel).await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    let status = server
        .get("/api/billing/status")
        .add_header(USER_ID_HEADER, user.id.to_string())
        .await;
    let status: Value = status.json();
    assert_eq!(status["tier"], json!("free"));
}

#[sqlx::test]
async fn pro_tier_lifts_the_watchlist_cap(pool: PgPool) {
    let mut config = create_test_config();
    config.limits.free_watchlist_limit = 1;
    let server = create_test_app_with(pool.clone(), config).await;
    let user = create_test_user(&pool).await;

    for symbol in ["AAPL", "MSFT"] {
        seed_stock(&pool, symbol, symbol).await;
    }

    server
        .post("/api/watchlist")
        .add_header(USER_ID_HEADER, user.id.to_string())
        .json(&json!({ "symbol": "AAPL" }))
        .await;

    let response = server
        .post("/api/watchlist")
        .add_header(USER_ID_HEADER, user.id.to_string())
        .json(&json!({ "symbol": "MSFT" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // Upgrade via webhook, then the cap no longer applies
    server
        .post("/api/webhooks/payments")
        .json(&json!({ "type": "checkout.completed", "user_id": user.id.to_string() }))
        .await;

    let response = server
        .post("/api/watchlist")
        .add_header(USER_ID_HEADER, user.id.to_string())
        .json(&json!({ "symbol": "MSFT" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
}

#[sqlx::test]
async fn checkout_returns_provider_url(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;
    let user = create_test_user(&pool).await;

    let response = server
        .post("/api/billing/checkout")
        .add_header(USER_ID_HEADER, user.id.to_string())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert!(body["url"].as_str().unwrap().contains(&user.id.to_string()));
}

#[sqlx::test]
async fn billing_endpoints_answer_501_without_provider(pool: PgPool) {
    let mut config = create_test_config();
    config.payment = None;
    let server = create_test_app_with(pool.clone(), config).await;
    let user = create_test_user(&pool).await;

    let response = server
        .post("/api/billing/checkout")
        .add_header(USER_ID_HEADER, user.id.to_string())
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_IMPLEMENTED);
}

// --- Admin / config ---

#[sqlx::test]
async fn admin_sync_requires_the_configured_key(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;

    let response = server.post("/api/admin/sync").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = server
        .post("/api/admin/sync")
        .add_header("authorization", "Bearer wrong-key")
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    // Right key, but no data_sync config on this deployment
    let response = server
        .post("/api/admin/sync")
        .add_header("authorization", format!("Bearer {TEST_ADMIN_KEY}"))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_IMPLEMENTED);
}

#[sqlx::test]
async fn admin_endpoints_vanish_without_a_key(pool: PgPool) {
    let mut config = create_test_config();
    config.admin_api_key = None;
    let server = create_test_app_with(pool.clone(), config).await;

    let response = server
        .post("/api/admin/sync")
        .add_header("authorization", format!("Bearer {TEST_ADMIN_KEY}"))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[sqlx::test]
async fn client_config_reflects_deployment(pool: PgPool) {
    let server = create_test_app(pool).await;

    let response = server.get("/api/config").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["push_enabled"], json!(false));
    assert_eq!(body["billing_enabled"], json!(true));
    assert_eq!(body["invite_required"], json!(false));
    assert_eq!(body["free_watchlist_limit"], json!(10));
}

#[sqlx::test]
async fn healthz_is_alive(pool: PgPool) {
    let server = create_test_app(pool).await;
    let response = server.get("/healthz").await;
    assert_eq!(response.status_code(), StatusCode::OK);
}
