//! Web-push delivery service.
//!
//! Wraps the `web-push` crate: builds VAPID-signed messages from stored
//! subscription rows and sends JSON payloads the service worker renders as a
//! notification. Constructed once at startup from [`PushConfig`]; when push
//! is not configured the subscribe/test endpoints answer 501.

use serde::Serialize;
use web_push::{
    ContentEncoding, HyperWebPushClient, SubscriptionInfo, URL_SAFE_NO_PAD, VapidSignatureBuilder, WebPushClient,
    WebPushMessageBuilder,
};

use crate::{config::PushConfig, db::models::push_subscriptions::PushSubscriptionDBResponse, errors::Error};

/// What happened to a single send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Delivered,
    /// The push service reported the endpoint gone; the caller should prune
    /// the subscription row.
    SubscriptionGone,
}

/// The JSON payload the service worker receives.
#[derive(Debug, Clone, Serialize)]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

pub struct PushService {
    client: HyperWebPushClient,
    public_key: String,
    private_key: String,
    subject: String,
}

impl PushService {
    pub fn new(config: &PushConfig) -> Self {
        Self {
            client: HyperWebPushClient::new(),
            public_key: config.vapid_public_key.clone(),
            private_key: config.vapid_private_key.clone(),
            subject: config.subject.clone(),
        }
    }

    /// The public VAPID key browsers need when calling
    /// `pushManager.subscribe`.
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Send one payload to one subscription.
    pub async fn send(&self, subscription: &PushSubscriptionDBResponse, payload: &PushPayload) -> Result<PushOutcome, Error> {
        let info = SubscriptionInfo::new(&subscription.endpoint, &subscription.p256dh, &subscription.auth);

        let mut signature = VapidSignatureBuilder::from_base64(&self.private_key, URL_SAFE_NO_PAD, &info).map_err(|e| {
            Error::Internal {
                operation: format!("build VAPID signature: {e}"),
            }
        })?;
        signature.add_claim("sub", self.subject.as_str());

        let body = serde_json::to_vec(payload).map_err(|e| Error::Internal {
            operation: format!("serialize push payload: {e}"),
        })?;

        let mut message = WebPushMessageBuilder::new(&info);
        message.set_payload(ContentEncoding::Aes128Gcm, &body);
        message.set_vapid_signature(signature.build().map_err(|e| Error::Internal {
            operation: format!("sign push message: {e}"),
        })?);

        match self
            .client
            .send(message.build().map_err(|e| Error::Internal {
                operation: format!("build push message: {e}"),
            })?)
            .await
        {
            Ok(()) => Ok(PushOutcome::Delivered),
            // Gone endpoints are expected churn (browser unsubscribed,
            // permissions revoked), not errors.
            Err(e) if matches!(e.short_description(), "endpoint_not_valid" | "endpoint_not_found") => {
                tracing::debug!(endpoint = %subscription.endpoint, "Push endpoint gone");
                Ok(PushOutcome::SubscriptionGone)
            }
            Err(e) => Err(Error::Upstream {
                service: "push delivery".to_string(),
                message: e.to_string(),
            }),
        }
    }
}
