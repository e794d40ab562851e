//! Shared helpers for integration tests.

use crate::api::models::predictions::Signal;
use crate::api::models::users::RegistrationType;
use crate::config::{Config, DatabaseConfig, DummyPaymentConfig, PaymentConfig};
use crate::db::handlers::{Invites, Predictions, Stocks, Users};
use crate::db::models::users::{UserCreateDBRequest, UserDBResponse};
use axum_test::TestServer;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

pub const TEST_ADMIN_KEY: &str = "test-admin-key";

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database: DatabaseConfig::External {
            // Tests construct the app around an existing pool; never dialed.
            url: "postgres://unused".to_string(),
        },
        payment: Some(PaymentConfig::Dummy(DummyPaymentConfig::default())),
        push: None,
        admin_api_key: Some(TEST_ADMIN_KEY.to_string()),
        ..Default::default()
    }
}

pub async fn create_test_app(pool: PgPool) -> TestServer {
    create_test_app_with(pool, create_test_config()).await
}

pub async fn create_test_app_with(pool: PgPool, config: Config) -> TestServer {
    crate::Application::new_with_pool(config, pool)
        .await
        .expect("Failed to create application")
        .into_test_server()
}

pub async fn create_test_user(pool: &PgPool) -> UserDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut users = Users::new(&mut conn);

    let id = Uuid::new_v4();
    let (user, created) = users
        .register(&UserCreateDBRequest {
            id,
            registration_type: RegistrationType::Anonymous,
            referral_code: format!("T{}", id.simple().to_string()[..7].to_ascii_uppercase()),
            referred_by: None,
        })
        .await
        .expect("Failed to create test user");
    assert!(created);
    user
}

pub async fn seed_stock(pool: &PgPool, symbol: &str, name: &str) {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut stocks = Stocks::new(&mut conn);
    stocks.insert(symbol, name, None).await.expect("Failed to seed stock");
}

pub async fn seed_price(pool: &PgPool, symbol: &str, date: NaiveDate, close: Decimal) {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut stocks = Stocks::new(&mut conn);
    stocks.insert_price(symbol, date, close, 1_000_000).await.expect("Failed to seed price");
}

pub async fn seed_prediction(pool: &PgPool, symbol: &str, date: NaiveDate, signal: Signal, confidence: f64) {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut predictions = Predictions::new(&mut conn);
    predictions
        .insert(symbol, date, signal, confidence, Decimal::new(10_000, 2), 1)
        .await
        .expect("Failed to seed prediction");
}

pub async fn seed_invite(pool: &PgPool, code: &str, max_uses: i32) {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut invites = Invites::new(&mut conn);
    invites.create(code, max_uses).await.expect("Failed to seed invite");
}
