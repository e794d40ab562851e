//! API model for the public client bootstrap configuration.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// What the frontend needs to know before any user interaction.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClientConfigResponse {
    /// Whether web-push is configured (controls the notification UI)
    pub push_enabled: bool,
    /// Whether a payment provider is configured (controls the upgrade UI)
    pub billing_enabled: bool,
    /// Whether registration requires an invite code
    pub invite_required: bool,
    /// Watchlist size cap for free-tier users
    pub free_watchlist_limit: i64,
}
