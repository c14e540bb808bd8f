use serde::{Deserialize, Serialize};

use crate::config::AdminConfig;
use crate::error::AppError;

/// Request body for user registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Unique username (1-50 chars: letters, digits, `_`, `.`, `-`).
    #[schema(example = "alice")]
    pub username: String,
    /// Unique email address (at most 100 characters).
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// Password (8-128 characters).
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_username(username: &str) -> Result<(), AppError> {
    let username = username.trim();
    if username.is_empty() || username.chars().count() > 50 {
        return Err(AppError::field(
            "username",
            "Username must be 1-50 characters",
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(AppError::field(
            "username",
            "Username may contain only letters, digits, '_', '.' and '-'",
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    let invalid = || AppError::field("email", "Enter a valid email address");
    if email.chars().count() > 100 {
        return Err(AppError::field(
            "email",
            "Email must be at most 100 characters",
        ));
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.is_empty()
        || domain.contains('@')
        || email.chars().any(char::is_whitespace)
    {
        return Err(invalid());
    }
    Ok(())
}

/// Lower-case the domain part; the local part is kept as typed.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    let len = password.chars().count();
    if !(8..=128).contains(&len) {
        return Err(AppError::field(
            "password",
            "Password must be 8-128 characters",
        ));
    }
    Ok(())
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    validate_username(&payload.username)?;
    validate_email(&payload.email)?;
    validate_password(&payload.password)
}

/// The configured administrator's username and email cannot be claimed
/// through registration. Both comparisons ignore case.
pub fn ensure_not_reserved(
    username: &str,
    email: &str,
    admin: &AdminConfig,
) -> Result<(), AppError> {
    if username.trim().eq_ignore_ascii_case(admin.username.trim()) {
        return Err(AppError::field("username", "This username is reserved"));
    }
    if email.trim().eq_ignore_ascii_case(admin.email().trim()) {
        return Err(AppError::field("email", "This email is reserved"));
    }
    Ok(())
}

/// Request body for user login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.email.trim().is_empty() {
        return Err(AppError::field("email", "Email must not be empty"));
    }
    if payload.password.is_empty() {
        return Err(AppError::field("password", "Password must not be empty"));
    }
    Ok(())
}

/// Access/refresh token pair issued on login.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TokenPairResponse {
    /// Short-lived bearer token for API requests.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access: String,
    /// Long-lived token exchangeable at `/auth/token/refresh`.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub refresh: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AccessTokenResponse {
    pub access: String,
}
