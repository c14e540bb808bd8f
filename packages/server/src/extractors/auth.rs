use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt::{self, TokenType};

/// Acting user resolved from the `Authorization: Bearer <access token>` header.
///
/// Take `AuthUser` as a handler parameter to require authentication, or
/// `Option<AuthUser>` for endpoints that anonymous callers may also use.
/// Resource-level checks live in [`crate::policy`].
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub is_staff: bool,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.is_staff
    }
}

fn bearer_token(parts: &Parts) -> Option<Result<&str, AppError>> {
    let header = parts.headers.get("Authorization")?;
    Some(
        header
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(AppError::TokenInvalid),
    )
}

fn resolve(token: &str, state: &AppState) -> Result<AuthUser, AppError> {
    let claims = jwt::verify(token, TokenType::Access, &state.config.auth.jwt_secret)
        .map_err(|e| {
            tracing::debug!("Rejected bearer token: {e}");
            AppError::TokenInvalid
        })?;

    Ok(AuthUser {
        user_id: claims.sub,
        username: claims.username,
        is_staff: claims.is_staff,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::TokenMissing)??;
        resolve(token, state)
    }
}

/// No header means anonymous; a present but bad token is still rejected.
impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        match bearer_token(parts) {
            None => Ok(None),
            Some(token) => resolve(token?, state).map(Some),
        }
    }
}
