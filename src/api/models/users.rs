//! API request/response models for users.

use crate::db::models::users::UserDBResponse;
use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// How the account came to exist: minted anonymously on first app load, or
/// explicitly upgraded with a username/email.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "registration_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RegistrationType {
    Anonymous,
    Explicit,
}

/// Subscription tier gating feature access.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "user_tier", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Pro,
}

// User request models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserRegister {
    /// Client-minted anonymous identity
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    /// Required when invite gating is enabled and the user is new
    pub invite_code: Option<String>,
    /// Referral code of the user who invited this one
    pub referral_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
}

// User response models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub registration_type: RegistrationType,
    pub username: Option<String>,
    pub email: Option<String>,
    pub tier: Tier,
    pub referral_code: String,
    /// Whether this user has an associated payment provider customer record.
    pub has_payment_provider_id: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    /// Whether this call created the account (false on idempotent replays)
    pub created: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReferralResponse {
    pub referral_code: String,
    /// How many users registered with this code
    pub referred_count: i64,
}

/// The resolved identity behind the `x-user-id` header, loaded from the
/// database by the extractor in [`crate::auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: UserId,
    pub registration_type: RegistrationType,
    pub username: Option<String>,
    pub email: Option<String>,
    pub tier: Tier,
    pub payment_provider_id: Option<String>,
    pub referral_code: String,
}

impl From<UserDBResponse> for UserResponse {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            registration_type: db.registration_type,
            username: db.username,
            email: db.email,
            tier: db.tier,
            referral_code: db.referral_code,
            has_payment_provider_id: db.payment_provider_id.is_some(),
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<UserDBResponse> for CurrentUser {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            registration_type: db.registration_type,
            username: db.username,
            email: db.email,
            tier: db.tier,
            payment_provider_id: db.payment_provider_id,
            referral_code: db.referral_code,
        }
    }
}
