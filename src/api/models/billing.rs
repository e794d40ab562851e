//! API request/response models for billing.

use crate::api::models::users::Tier;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BillingStatusResponse {
    pub tier: Tier,
    /// Whether a payment provider is configured at all
    pub billing_enabled: bool,
    /// Whether this user has a customer record at the provider
    pub has_customer: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutSessionResponse {
    /// Provider-hosted checkout page the client should navigate to
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BillingPortalResponse {
    /// Provider-hosted billing portal for self-service management
    pub url: String,
}
