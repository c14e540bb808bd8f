use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::choice::{Grade, Role};
use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::auth::{
    AccessTokenResponse, LoginRequest, RefreshRequest, RegisterRequest, TokenPairResponse,
    ensure_not_reserved, normalize_email, validate_login_request, validate_register_request,
};
use crate::models::user::UserSelfResponse;
use crate::state::AppState;
use crate::utils::jwt::{self, TokenType};
use crate::utils::{hash, user as users};

#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    operation_id = "register",
    summary = "Register a new user",
    description = "Creates a user account. Role and grade start as `not_selected`. Username and email must be unique and may not be the configured administrator's; a clash is reported as VALIDATION_ERROR naming the field.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = UserSelfResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_request(&payload)?;

    let username = payload.username.trim().to_string();
    let email = normalize_email(&payload.email);
    ensure_not_reserved(&username, &email, &state.config.admin)?;

    let hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let txn = state.db.begin().await?;
    users::ensure_username_free(&txn, &username).await?;
    users::ensure_email_free(&txn, &email).await?;

    let model = user::ActiveModel {
        id: Set(Uuid::now_v7()),
        username: Set(username),
        email: Set(email),
        password: Set(hash),
        role_id: Set(Role::NotSelected),
        grade_id: Set(Grade::NotSelected),
        is_staff: Set(false),
        is_active: Set(true),
        date_joined: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    tracing::info!(user_id = %model.id, "User registered");
    let view = users::self_view(&state.db, model).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Log in with email and password",
    description = "Returns an access/refresh JWT pair. Inactive accounts cannot log in.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenPairResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Invalid credentials (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<TokenPairResponse>, AppError> {
    validate_login_request(&payload)?;

    let user = user::Entity::find()
        .filter(user::Column::Email.eq(normalize_email(&payload.email)))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password(&payload.password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;

    if !is_valid || !user.is_active {
        return Err(AppError::InvalidCredentials);
    }

    let auth = &state.config.auth;
    let access = jwt::sign_access(user.id, &user.username, user.is_staff, auth)
        .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;
    let refresh = jwt::sign_refresh(user.id, &user.username, user.is_staff, auth)
        .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    Ok(Json(TokenPairResponse { access, refresh }))
}

#[utoipa::path(
    post,
    path = "/token/refresh",
    tag = "Auth",
    operation_id = "refreshToken",
    summary = "Exchange a refresh token for a new access token",
    description = "Only refresh tokens are accepted. The account must still exist and be active; staff status is re-read from the directory.",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = AccessTokenResponse),
        (status = 401, description = "Invalid or expired refresh token (TOKEN_INVALID)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RefreshRequest>,
) -> Result<Json<AccessTokenResponse>, AppError> {
    let auth = &state.config.auth;
    let claims = jwt::verify(&payload.refresh, TokenType::Refresh, &auth.jwt_secret)
        .map_err(|e| {
            tracing::debug!("Rejected refresh token: {e}");
            AppError::TokenInvalid
        })?;

    let user = user::Entity::find_by_id(claims.sub)
        .one(&state.db)
        .await?
        .filter(|u| u.is_active)
        .ok_or(AppError::TokenInvalid)?;

    let access = jwt::sign_access(user.id, &user.username, user.is_staff, auth)
        .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    Ok(Json(AccessTokenResponse { access }))
}
