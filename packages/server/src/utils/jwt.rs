use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("expected a {expected:?} token")]
    WrongType { expected: TokenType },
    #[error("token lifetime out of range")]
    Lifetime,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT Claims structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // User ID
    pub username: String,
    pub is_staff: bool,
    pub token_type: TokenType,
    pub exp: usize, // Expiration timestamp
}

fn sign(
    user_id: Uuid,
    username: &str,
    is_staff: bool,
    token_type: TokenType,
    ttl: Duration,
    secret: &str,
) -> Result<String, TokenError> {
    let expiration = Utc::now()
        .checked_add_signed(ttl)
        .ok_or(TokenError::Lifetime)?
        .timestamp();

    let claims = Claims {
        sub: user_id,
        username: username.to_owned(),
        is_staff,
        token_type,
        exp: expiration as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Sign a short-lived access token.
pub fn sign_access(
    user_id: Uuid,
    username: &str,
    is_staff: bool,
    config: &AuthConfig,
) -> Result<String, TokenError> {
    sign(
        user_id,
        username,
        is_staff,
        TokenType::Access,
        Duration::minutes(config.access_token_ttl_minutes),
        &config.jwt_secret,
    )
}

/// Sign a refresh token, exchangeable for new access tokens.
pub fn sign_refresh(
    user_id: Uuid,
    username: &str,
    is_staff: bool,
    config: &AuthConfig,
) -> Result<String, TokenError> {
    sign(
        user_id,
        username,
        is_staff,
        TokenType::Refresh,
        Duration::days(config.refresh_token_ttl_days),
        &config.jwt_secret,
    )
}

/// Verify and decode a JWT token of the expected type.
pub fn verify(token: &str, expected: TokenType, secret: &str) -> Result<Claims, TokenError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    if token_data.claims.token_type != expected {
        return Err(TokenError::WrongType { expected });
    }
    Ok(token_data.claims)
}
