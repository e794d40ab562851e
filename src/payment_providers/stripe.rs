//! Stripe implementation of the payment provider interface.

use async_trait::async_trait;
use axum::http::HeaderMap;
use stripe::{
    CheckoutSession, CheckoutSessionMode, Client, CreateCheckoutSession, CreateCheckoutSessionLineItems, EventObject,
    EventType, Webhook,
};

use crate::{
    api::models::users::CurrentUser,
    config::StripeConfig,
    payment_providers::{PaymentError, PaymentProvider, Result, WebhookEvent},
};

pub struct StripeProvider {
    client: Client,
    price_id: String,
    webhook_secret: String,
}

impl From<StripeConfig> for StripeProvider {
    fn from(config: StripeConfig) -> Self {
        Self {
            client: Client::new(config.api_key),
            price_id: config.price_id,
            webhook_secret: config.webhook_secret,
        }
    }
}

#[async_trait]
impl PaymentProvider for StripeProvider {
    /// Create a Stripe checkout session in subscription mode.
    ///
    /// If the user has no Stripe customer yet, Stripe creates one; the
    /// customer ID is persisted when the completion webhook arrives.
    async fn create_checkout_session(&self, user: &CurrentUser, success_url: &str, cancel_url: &str) -> Result<String> {
        let user_ref = user.id.to_string();

        let mut checkout_params = CreateCheckoutSession {
            cancel_url: Some(cancel_url),
            success_url: Some(success_url),
            client_reference_id: Some(&user_ref),
            mode: Some(CheckoutSessionMode::Subscription),
            line_items: Some(vec![CreateCheckoutSessionLineItems {
                price: Some(self.price_id.clone()),
                quantity: Some(1),
                ..Default::default()
            }]),
            ..Default::default()
        };

        // Reuse the existing customer record where we have one, otherwise
        // hand Stripe the email (if any) for the customer it creates.
        if let Some(existing_id) = &user.payment_provider_id {
            tracing::debug!(customer_id = %existing_id, user_id = %user.id, "Using existing Stripe customer");
            checkout_params.customer = Some(
                existing_id
                    .parse()
                    .map_err(|_| PaymentError::InvalidData(format!("stored customer ID {existing_id} is not valid")))?,
            );
        } else if let Some(email) = &user.email {
            checkout_params.customer_email = Some(email);
        }

        let checkout_session = CheckoutSession::create(&self.client, checkout_params)
            .await
            .map_err(|e| PaymentError::ProviderApi(format!("create checkout session: {e}")))?;

        tracing::info!(session_id = %checkout_session.id, user_id = %user.id, "Created checkout session");

        checkout_session
            .url
            .ok_or_else(|| PaymentError::ProviderApi("checkout session missing URL".to_string()))
    }

    async fn create_billing_portal_session(&self, user: &CurrentUser, return_url: &str) -> Result<String> {
        let customer_id = user
            .payment_provider_id
            .as_deref()
            .ok_or(PaymentError::NoCustomerId)?
            .parse()
            .map_err(|_| PaymentError::InvalidData("stored customer ID is not valid".to_string()))?;

        let mut params = stripe::CreateBillingPortalSession::new(customer_id);
        params.return_url = Some(return_url);

        let session = stripe::BillingPortalSession::create(&self.client, params)
            .await
            .map_err(|e| PaymentError::ProviderApi(format!("create billing portal session: {e}")))?;

        Ok(session.url)
    }

    async fn validate_webhook(&self, headers: &HeaderMap, body: &str) -> Result<WebhookEvent> {
        let signature = headers
            .get("stripe-signature")
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| PaymentError::InvalidData("missing stripe-signature header".to_string()))?;

        let event = Webhook::construct_event(body, signature, &self.webhook_secret)
            .map_err(|e| PaymentError::InvalidData(format!("webhook signature validation failed: {e}")))?;

        match event.type_ {
            EventType::CheckoutSessionCompleted | EventType::CheckoutSessionAsyncPaymentSucceeded => {
                let EventObject::CheckoutSession(session) = event.data.object else {
                    return Err(PaymentError::InvalidData("expected checkout session object".to_string()));
                };
                Ok(WebhookEvent::CheckoutCompleted {
                    client_reference_id: session.client_reference_id,
                    customer_id: session.customer.map(|c| c.id().to_string()),
                })
            }
            EventType::CustomerSubscriptionDeleted => {
                let EventObject::Subscription(subscription) = event.data.object else {
                    return Err(PaymentError::InvalidData("expected subscription object".to_string()));
                };
                Ok(WebhookEvent::SubscriptionCanceled {
                    customer_id: subscription.customer.id().to_string(),
                })
            }
            other => {
                tracing::debug!(event_type = ?other, "Ignoring webhook event type");
                Ok(WebhookEvent::Ignored)
            }
        }
    }
}
