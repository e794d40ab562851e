//! HTTP handlers for billing endpoints.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::Json,
};

use crate::{
    AppState,
    api::models::billing::{BillingPortalResponse, BillingStatusResponse, CheckoutSessionResponse},
    api::models::users::CurrentUser,
    errors::{Error, Result},
    payment_providers::{PaymentProvider, apply_webhook_event},
};

fn provider(state: &AppState) -> Result<&dyn PaymentProvider> {
    state.payment.as_deref().ok_or_else(|| Error::NotConfigured {
        feature: "Billing".to_string(),
    })
}

/// Resolve the origin the client is browsing from, for building redirect
/// URLs back into the dashboard.
fn request_origin(headers: &HeaderMap) -> String {
    headers
        .get(header::ORIGIN)
        .or_else(|| headers.get(header::REFERER))
        .and_then(|h| h.to_str().ok())
        .and_then(|s| {
            // If it's a referer, extract just the origin part
            if let Ok(url) = url::Url::parse(s) {
                url.origin().ascii_serialization().into()
            } else {
                Some(s.to_string())
            }
        })
        .unwrap_or_else(|| {
            // Fallback to constructing from Host header
            let host = headers
                .get(header::HOST)
                .and_then(|h| h.to_str().ok())
                .unwrap_or("localhost:3001");

            // Determine protocol - check X-Forwarded-Proto for proxied requests
            let proto = headers
                .get("x-forwarded-proto")
                .and_then(|h| h.to_str().ok())
                .unwrap_or("http");

            format!("{proto}://{host}")
        })
}

/// The caller's tier and billing availability.
#[utoipa::path(
    get,
    path = "/billing/status",
    tag = "billing",
    responses(
        (status = 200, description = "Billing status", body = BillingStatusResponse),
        (status = 404, description = "Identity has never registered"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn billing_status(State(state): State<AppState>, user: CurrentUser) -> Result<Json<BillingStatusResponse>> {
    Ok(Json(BillingStatusResponse {
        tier: user.tier,
        billing_enabled: state.payment.is_some(),
        has_customer: user.payment_provider_id.is_some(),
    }))
}

/// Create a checkout session for the pro subscription.
#[utoipa::path(
    post,
    path = "/billing/checkout",
    tag = "billing",
    responses(
        (status = 200, description = "Checkout session URL", body = CheckoutSessionResponse),
        (status = 404, description = "Identity has never registered"),
        (status = 501, description = "No payment provider configured"),
        (status = 502, description = "Payment provider unavailable"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn create_checkout(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: CurrentUser,
) -> Result<Json<CheckoutSessionResponse>> {
    let provider = provider(&state)?;

    let origin = request_origin(&headers);
    let success_url = format!("{origin}/account?billing=success");
    let cancel_url = format!("{origin}/account?billing=cancelled");

    let url = provider.create_checkout_session(&user, &success_url, &cancel_url).await?;

    Ok(Json(CheckoutSessionResponse { url }))
}

/// Create a billing portal session for self-service management.
#[utoipa::path(
    post,
    path = "/billing/portal",
    tag = "billing",
    responses(
        (status = 200, description = "Billing portal URL", body = BillingPortalResponse),
        (status = 400, description = "No billing account exists for this user"),
        (status = 404, description = "Identity has never registered"),
        (status = 501, description = "No payment provider configured"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn create_portal(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: CurrentUser,
) -> Result<Json<BillingPortalResponse>> {
    let provider = provider(&state)?;

    let origin = request_origin(&headers);
    let return_url = format!("{origin}/account");

    let url = provider.create_billing_portal_session(&user, &return_url).await?;

    Ok(Json(BillingPortalResponse { url }))
}

/// Payment provider webhook.
///
/// Signature validation failures are the caller's problem (400); once an
/// event validates we always answer 200 so the provider doesn't retry —
/// processing is idempotent, and a lost tier change heals on the next event.
#[utoipa::path(
    post,
    path = "/webhooks/payments",
    tag = "billing",
    responses(
        (status = 200, description = "Event accepted"),
        (status = 400, description = "Invalid signature or malformed event"),
        (status = 501, description = "No payment provider configured"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn webhook_handler(State(state): State<AppState>, headers: HeaderMap, body: String) -> Result<StatusCode> {
    let provider = provider(&state)?;

    let event = provider.validate_webhook(&headers, &body).await?;

    if let Err(e) = apply_webhook_event(&state.db, &event).await {
        tracing::error!(error = %e, "Failed to apply payment webhook event");
    }

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn origin_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ORIGIN, HeaderValue::from_static("https://app.tickerdeck.app"));
        headers.insert(header::HOST, HeaderValue::from_static("ignored.example"));
        assert_eq!(request_origin(&headers), "https://app.tickerdeck.app");
    }

    #[test]
    fn referer_is_reduced_to_its_origin() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::REFERER,
            HeaderValue::from_static("https://app.tickerdeck.app/account?tab=billing"),
        );
        assert_eq!(request_origin(&headers), "https://app.tickerdeck.app");
    }

    #[test]
    fn falls_back_to_host_and_forwarded_proto() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("deck.example.com"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        assert_eq!(request_origin(&headers), "https://deck.example.com");
    }
}
