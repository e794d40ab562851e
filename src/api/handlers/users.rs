//! HTTP handlers for user registration and profile management.

use axum::{extract::State, http::StatusCode, response::Json};
use rand::Rng;

use crate::{
    AppState,
    api::models::users::{
        CurrentUser, ReferralResponse, RegisterResponse, RegistrationType, UserRegister, UserResponse, UserUpdate,
    },
    auth::Identity,
    db::{
        errors::DbError,
        handlers::{Invites, Repository, Users},
        models::users::{UserCreateDBRequest, UserUpdateDBRequest},
        retry::with_retries,
    },
    errors::{Error, Result},
};

const REFERRAL_CODE_LEN: usize = 8;
const REFERRAL_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Generate a fresh referral code. The alphabet drops easily-confused
/// characters (0/O, 1/I) since users read these aloud.
pub fn generate_referral_code() -> String {
    let mut rng = rand::thread_rng();
    (0..REFERRAL_CODE_LEN)
        .map(|_| REFERRAL_CODE_ALPHABET[rng.gen_range(0..REFERRAL_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Register the identity in the request body.
///
/// Idempotent: replaying the same `user_id` is a no-op that returns the
/// existing row. Invite gating and referral attribution only apply to the
/// call that actually creates the row.
#[utoipa::path(
    post,
    path = "/users/register",
    tag = "users",
    request_body = UserRegister,
    responses(
        (status = 201, description = "User registered (or already existed)", body = RegisterResponse),
        (status = 400, description = "Invite code required, invalid, or exhausted"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %data.user_id))]
pub async fn register(State(state): State<AppState>, Json(data): Json<UserRegister>) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let pool = state.db.clone();
    let invite_required = state.config.invites.required;
    let referral_code = generate_referral_code();

    let (user, created) = with_retries("register user", || {
        let pool = pool.clone();
        let data = data.clone();
        let referral_code = referral_code.clone();
        async move {
            let mut tx = pool.begin().await?;
            let mut users = Users::new(&mut tx);

            // Replay: the row already exists, nothing to gate or attribute.
            if let Some(existing) = users.get_by_id(data.user_id).await? {
                tx.commit().await?;
                return Ok((existing, false));
            }

            let referred_by = match &data.referral_code {
                Some(code) => users.get_by_referral_code(code).await?.map(|u| u.id),
                None => None,
            };

            if invite_required {
                let code = data.invite_code.as_deref().ok_or_else(|| {
                    DbError::CheckViolation {
                        constraint: Some("invite_required".to_string()),
                        table: None,
                        message: "registration requires an invite code".to_string(),
                    }
                })?;
                let mut invites = Invites::new(&mut tx);
                if !invites.consume(code).await? {
                    return Err(DbError::CheckViolation {
                        constraint: Some("invite_required".to_string()),
                        table: None,
                        message: "invite code is invalid or exhausted".to_string(),
                    });
                }
            }

            let mut users = Users::new(&mut tx);
            let (user, created) = users
                .register(&UserCreateDBRequest {
                    id: data.user_id,
                    registration_type: RegistrationType::Anonymous,
                    referral_code,
                    referred_by,
                })
                .await?;

            tx.commit().await?;
            Ok((user, created))
        }
    })
    .await
    .map_err(|e| match e {
        DbError::CheckViolation { message, .. } => Error::BadRequest { message },
        other => Error::Database(other),
    })?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: UserResponse::from(user),
            created,
        }),
    ))
}

/// Get the caller's profile.
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "users",
    responses(
        (status = 200, description = "The caller's profile", body = UserResponse),
        (status = 401, description = "Missing or malformed x-user-id header"),
        (status = 404, description = "Identity has never registered"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_me(State(state): State<AppState>, Identity(user_id): Identity) -> Result<Json<UserResponse>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut users = Users::new(&mut conn);

    let user = users.get_by_id(user_id).await?.ok_or_else(|| Error::NotFound {
        resource: "User".to_string(),
        id: user_id.to_string(),
    })?;

    Ok(Json(UserResponse::from(user)))
}

/// Update the caller's profile, optionally upgrading to an explicit account.
#[utoipa::path(
    patch,
    path = "/users/me",
    tag = "users",
    request_body = UserUpdate,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Empty username or email"),
        (status = 404, description = "Identity has never registered"),
        (status = 409, description = "Username or email already taken"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn update_me(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(data): Json<UserUpdate>,
) -> Result<Json<UserResponse>> {
    if data.username.as_deref().is_some_and(|u| u.trim().is_empty()) {
        return Err(Error::BadRequest {
            message: "username must not be empty".to_string(),
        });
    }
    if data.email.as_deref().is_some_and(|e| e.trim().is_empty() || !e.contains('@')) {
        return Err(Error::BadRequest {
            message: "email must be a valid address".to_string(),
        });
    }

    // Supplying both username and email completes the upgrade from an
    // anonymous identity to an explicit account.
    let now_explicit = match (&data.username, &data.email, user.registration_type) {
        (_, _, RegistrationType::Explicit) => None,
        (Some(_), Some(_), RegistrationType::Anonymous) => Some(RegistrationType::Explicit),
        (Some(_), None, _) if user.email.is_some() => Some(RegistrationType::Explicit),
        (None, Some(_), _) if user.username.is_some() => Some(RegistrationType::Explicit),
        _ => None,
    };

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut users = Users::new(&mut conn);

    let updated = users
        .update(
            user.id,
            &UserUpdateDBRequest {
                username: data.username,
                email: data.email,
                registration_type: now_explicit,
            },
        )
        .await?;

    Ok(Json(UserResponse::from(updated)))
}

/// Get the caller's referral code and how many users it brought in.
#[utoipa::path(
    get,
    path = "/users/me/referral",
    tag = "users",
    responses(
        (status = 200, description = "Referral code and usage", body = ReferralResponse),
        (status = 404, description = "Identity has never registered"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn get_referral(State(state): State<AppState>, user: CurrentUser) -> Result<Json<ReferralResponse>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut users = Users::new(&mut conn);

    let referred_count = users.count_referrals(user.id).await?;

    Ok(Json(ReferralResponse {
        referral_code: user.referral_code,
        referred_count,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referral_codes_have_expected_shape() {
        let code = generate_referral_code();
        assert_eq!(code.len(), REFERRAL_CODE_LEN);
        assert!(code.bytes().all(|b| REFERRAL_CODE_ALPHABET.contains(&b)));
    }

    #[test]
    fn referral_codes_avoid_confusable_characters() {
        for _ in 0..50 {
            let code = generate_referral_code();
            assert!(!code.contains('0') && !code.contains('O') && !code.contains('1') && !code.contains('I'));
        }
    }
}
