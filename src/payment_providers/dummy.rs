//! Dummy payment provider for tests and local development.
//!
//! Returns fixed URLs instead of calling out, and accepts unsigned JSON
//! webhooks of the form:
//!
//! ```json
//! { "type": "checkout.completed", "user_id": "…", "customer_id": "…" }
//! { "type": "subscription.canceled", "customer_id": "…" }
//! ```

use async_trait::async_trait;
use axum::http::HeaderMap;
use serde::Deserialize;

use crate::{
    api::models::users::CurrentUser,
    config::DummyPaymentConfig,
    payment_providers::{PaymentError, PaymentProvider, Result, WebhookEvent},
};

pub struct DummyProvider {
    redirect_url: String,
}

impl From<DummyPaymentConfig> for DummyProvider {
    fn from(config: DummyPaymentConfig) -> Self {
        let redirect_url = if config.redirect_url.is_empty() {
            "https://payments.invalid/session".to_string()
        } else {
            config.redirect_url
        };
        Self { redirect_url }
    }
}

#[derive(Debug, Deserialize)]
struct DummyWebhookBody {
    #[serde(rename = "type")]
    event_type: String,
    user_id: Option<String>,
    customer_id: Option<String>,
}

#[async_trait]
impl PaymentProvider for DummyProvider {
    async fn create_checkout_session(&self, user: &CurrentUser, _success_url: &str, _cancel_url: &str) -> Result<String> {
        Ok(format!("{}?checkout_for={}", self.redirect_url, user.id))
    }

    async fn create_billing_portal_session(&self, user: &CurrentUser, _return_url: &str) -> Result<String> {
        if user.payment_provider_id.is_none() {
            return Err(PaymentError::NoCustomerId);
        }
        Ok(format!("{}?portal_for={}", self.redirect_url, user.id))
    }

    async fn validate_webhook(&self, _headers: &HeaderMap, body: &str) -> Result<WebhookEvent> {
        let parsed: DummyWebhookBody =
            serde_json::from_str(body).map_err(|e| PaymentError::InvalidData(format!("malformed webhook body: {e}")))?;

        match parsed.event_type.as_str() {
            "checkout.completed" => Ok(WebhookEvent::CheckoutCompleted {
                client_reference_id: parsed.user_id,
                customer_id: parsed.customer_id,
            }),
            "subscription.canceled" => {
                let customer_id = parsed
                    .customer_id
                    .ok_or_else(|| PaymentError::InvalidData("subscription.canceled requires customer_id".to_string()))?;
                Ok(WebhookEvent::SubscriptionCanceled { customer_id })
            }
            _ => Ok(WebhookEvent::Ignored),
        }
    }
}
