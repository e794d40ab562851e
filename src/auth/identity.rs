use crate::{
    AppState,
    api::models::users::CurrentUser,
    db::{errors::DbError, handlers::{Repository, Users}},
    errors::{Error, Result},
    types::UserId,
};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{instrument, trace};

/// Header carrying the client-minted anonymous identity.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The raw identity claim from the `x-user-id` header: parsed, not yet
/// resolved against the database. Registration uses this directly; every
/// other endpoint wants [`CurrentUser`].
#[derive(Debug, Clone, Copy)]
pub struct Identity(pub UserId);

fn parse_user_id_header(parts: &Parts) -> Result<UserId> {
    let header = parts.headers.get(USER_ID_HEADER).ok_or(Error::Unauthenticated {
        message: Some(format!("missing {USER_ID_HEADER} header")),
    })?;

    let value = header.to_str().map_err(|_| Error::Unauthenticated {
        message: Some(format!("invalid {USER_ID_HEADER} header")),
    })?;

    value.parse::<UserId>().map_err(|_| Error::Unauthenticated {
        message: Some(format!("{USER_ID_HEADER} is not a valid UUID")),
    })
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self> {
        parse_user_id_header(parts).map(Identity)
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user_id = parse_user_id_header(parts)?;

        let mut conn = state.db.acquire().await.map_err(DbError::from)?;
        let mut users = Users::new(&mut conn);

        match users.get_by_id(user_id).await? {
            Some(user) => Ok(CurrentUser::from(user)),
            None => {
                trace!("Identity {user_id} has no user row (never registered)");
                Err(Error::NotFound {
                    resource: "User".to_string(),
                    id: user_id.to_string(),
                })
            }
        }
    }
}

/// Gate an admin endpoint behind the static `admin_api_key` from config.
///
/// Admin endpoints are disabled entirely (404) when no key is configured.
pub fn require_admin_key(state: &AppState, parts_headers: &axum::http::HeaderMap) -> Result<()> {
    let Some(expected) = state.config.admin_api_key.as_deref() else {
        return Err(Error::NotFound {
            resource: "Endpoint".to_string(),
            id: "admin".to_string(),
        });
    };

    let presented = parts_headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "));

    match presented {
        Some(key) if key == expected => Ok(()),
        _ => Err(Error::Unauthenticated {
            message: Some("invalid admin key".to_string()),
        }),
    }
}
