//! Payment provider abstraction layer
//!
//! This module defines the `PaymentProvider` trait which abstracts payment
//! processing across different providers. The provider is selected exactly
//! once at startup from [`PaymentConfig`]; handlers only see the trait
//! object.

use async_trait::async_trait;
use axum::http::HeaderMap;
use sqlx::PgPool;

use crate::{
    api::models::users::{CurrentUser, Tier},
    config::PaymentConfig,
    db::errors::DbError,
    db::handlers::Users,
    errors::Error,
};

pub mod dummy;
pub mod stripe;

/// Create a payment provider from configuration
///
/// This is the single point where we convert config into provider instances.
/// Adding a new provider requires adding a match arm here.
pub fn create_provider(config: PaymentConfig) -> Box<dyn PaymentProvider> {
    match config {
        PaymentConfig::Stripe(stripe_config) => Box::new(stripe::StripeProvider::from(stripe_config)),
        PaymentConfig::Dummy(dummy_config) => Box::new(dummy::DummyProvider::from(dummy_config)),
    }
}

/// Result type for payment provider operations
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Errors that can occur during payment processing
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment provider API error: {0}")]
    ProviderApi(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Invalid payment data: {0}")]
    InvalidData(String),

    #[error("User does not have a payment provider customer ID")]
    NoCustomerId,
}

impl From<PaymentError> for Error {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::InvalidData(message) => Error::BadRequest { message },
            PaymentError::NoCustomerId => Error::BadRequest {
                message: "No billing account exists for this user".to_string(),
            },
            PaymentError::Database(db) => Error::Database(db),
            PaymentError::ProviderApi(message) => Error::Upstream {
                service: "payment provider".to_string(),
                message,
            },
        }
    }
}

/// A validated webhook event, reduced to what tier management needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    /// Checkout finished: the user referenced by `client_reference_id` paid
    /// for the pro subscription.
    CheckoutCompleted {
        client_reference_id: Option<String>,
        customer_id: Option<String>,
    },
    /// The subscription was cancelled at the provider.
    SubscriptionCanceled { customer_id: String },
    /// A valid event we don't act on.
    Ignored,
}

/// Abstract payment provider interface
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a new checkout session
    ///
    /// Returns a URL that the user should be redirected to for payment.
    async fn create_checkout_session(&self, user: &CurrentUser, success_url: &str, cancel_url: &str) -> Result<String>;

    /// Create a billing portal session for customer self-service
    ///
    /// Returns a URL that the user should be redirected to for managing
    /// their subscription.
    async fn create_billing_portal_session(&self, user: &CurrentUser, return_url: &str) -> Result<String>;

    /// Validate and extract a webhook event from raw request data
    ///
    /// Returns Err if validation fails (invalid signature, malformed data).
    async fn validate_webhook(&self, headers: &HeaderMap, body: &str) -> Result<WebhookEvent>;
}

/// Apply a validated webhook event to the database.
///
/// Idempotent: re-applying a tier the user already has is a no-op, and
/// cancellation events for unknown customers are logged and dropped.
pub async fn apply_webhook_event(db_pool: &PgPool, event: &WebhookEvent) -> Result<()> {
    let mut tx = db_pool.begin().await.map_err(DbError::from)?;
    let mut users = Users::new(&mut tx);

    match event {
        WebhookEvent::CheckoutCompleted {
            client_reference_id,
            customer_id,
        } => {
            let user_ref = client_reference_id
                .as_deref()
                .ok_or_else(|| PaymentError::InvalidData("checkout session missing client_reference_id".to_string()))?;
            let user_id = user_ref
                .parse()
                .map_err(|_| PaymentError::InvalidData(format!("client_reference_id {user_ref} is not a UUID")))?;

            if let Some(customer_id) = customer_id {
                users.set_payment_provider_id(user_id, customer_id).await?;
            }

            let changed = users.set_tier(user_id, Tier::Pro).await?;
            if changed {
                tracing::info!(%user_id, "Upgraded user to pro tier");
            } else {
                tracing::debug!(%user_id, "Checkout replay: user already pro");
            }
        }
        WebhookEvent::SubscriptionCanceled { customer_id } => {
            match users.get_by_payment_provider_id(customer_id).await? {
                Some(user) => {
                    let changed = users.set_tier(user.id, Tier::Free).await?;
                    if changed {
                        tracing::info!(user_id = %user.id, "Downgraded user to free tier");
                    }
                }
                None => {
                    tracing::warn!(%customer_id, "Cancellation for unknown customer, ignoring");
                }
            }
        }
        WebhookEvent::Ignored => {}
    }

    tx.commit().await.map_err(DbError::from)?;
    Ok(())
}
