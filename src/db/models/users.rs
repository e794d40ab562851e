//! Database models for users.

use crate::api::models::users::{RegistrationType, Tier};
use crate::types::UserId;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database request for creating a new user.
///
/// The ID comes from the client (anonymous UUID identity minted on first app
/// load), so creation is idempotent on conflict.
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub id: UserId,
    pub registration_type: RegistrationType,
    pub referral_code: String,
    pub referred_by: Option<UserId>,
}

/// Database request for updating a user profile
#[derive(Debug, Clone, Default)]
pub struct UserUpdateDBRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub registration_type: Option<RegistrationType>,
}

/// Database response for a user
#[derive(Debug, Clone, FromRow)]
pub struct UserDBResponse {
    pub id: UserId,
    pub registration_type: RegistrationType,
    pub username: Option<String>,
    pub email: Option<String>,
    pub tier: Tier,
    pub payment_provider_id: Option<String>,
    pub referral_code: String,
    pub referred_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
