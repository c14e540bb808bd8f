use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::query::AppQuery;
use crate::models::shared::{Pagination, icontains, normalize_optional, page_params};
use crate::models::user::*;
use crate::policy::{Action, Resource, rule};
use crate::state::AppState;
use crate::utils::user::{
    delete_user_cascade, ensure_telegram_free, find_user, find_user_for_update, self_view,
    set_experience, set_skills,
};

#[utoipa::path(
    get,
    path = "/",
    tag = "Users",
    operation_id = "listUsers",
    summary = "List users",
    description = "Paginated public profiles ordered by username. Text filters are case-insensitive substring matches; `role_id` and `grade_id` match exactly.",
    params(UserListQuery),
    responses(
        (status = 200, description = "List of users", body = UserListResponse),
        (status = 400, description = "Invalid query (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_users(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<UserListQuery>,
) -> Result<Json<UserListResponse>, AppError> {
    rule(Resource::User, Action::List).authorize_actor(auth_user.as_ref())?;

    let (page, per_page) = page_params(query.page, query.per_page);

    let mut select = user::Entity::find();
    let text_filters = [
        (user::Column::Username, &query.username),
        (user::Column::Email, &query.email),
        (user::Column::Telegram, &query.telegram),
        (user::Column::Github, &query.github),
        (user::Column::Linkedin, &query.linkedin),
    ];
    for (column, value) in text_filters {
        if let Some(cond) = value.as_deref().and_then(|v| icontains(column, v)) {
            select = select.filter(cond);
        }
    }
    if let Some(role) = query.role_id {
        select = select.filter(user::Column::RoleId.eq(role));
    }
    if let Some(grade) = query.grade_id {
        select = select.filter(user::Column::GradeId.eq(grade));
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let data = select
        .order_by_asc(user::Column::Username)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(UserPublicResponse::from)
        .collect();

    Ok(Json(UserListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Users",
    operation_id = "getMe",
    summary = "Current user's full profile",
    responses(
        (status = 200, description = "Own profile", body = UserSelfResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Account no longer exists (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_me(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
) -> Result<Json<UserSelfResponse>, AppError> {
    let actor = rule(Resource::User, Action::Mine).authorize_actor(auth_user.as_ref())?;
    let model = find_user(&state.db, actor.user_id).await?;
    Ok(Json(self_view(&state.db, model).await?))
}

#[utoipa::path(
    patch,
    path = "/me",
    tag = "Users",
    operation_id = "updateMe",
    summary = "Update own profile",
    description = "PATCH semantics. `skills_ids` and `experience`, when present, replace the whole collection in the same transaction.",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserSelfResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Unknown skill (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_me(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<UserSelfResponse>, AppError> {
    let update = rule(Resource::User, Action::Update);
    let actor = update.authorize_actor(auth_user.as_ref())?;
    apply_update(&state, actor, actor.user_id, payload).await
}

#[utoipa::path(
    put,
    path = "/me/skills",
    tag = "Users",
    operation_id = "setMySkills",
    summary = "Replace own skill set",
    description = "Duplicate ids collapse. An empty list removes every skill.",
    request_body = SetSkillsRequest,
    responses(
        (status = 200, description = "Skills replaced", body = UserSelfResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Skill not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(count = payload.skills_ids.len()))]
pub async fn set_my_skills(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    AppJson(payload): AppJson<SetSkillsRequest>,
) -> Result<Json<UserSelfResponse>, AppError> {
    let actor =
        rule(Resource::User, Action::SetCollection).authorize_actor(auth_user.as_ref())?;
    validate_skills_ids(&payload.skills_ids)?;

    let txn = state.db.begin().await?;
    find_user_for_update(&txn, actor.user_id).await?;
    set_skills(&txn, actor.user_id, &payload.skills_ids).await?;
    txn.commit().await?;

    let model = find_user(&state.db, actor.user_id).await?;
    Ok(Json(self_view(&state.db, model).await?))
}

#[utoipa::path(
    put,
    path = "/me/experience",
    tag = "Users",
    operation_id = "setMyExperience",
    summary = "Replace own work history",
    request_body = SetExperienceRequest,
    responses(
        (status = 200, description = "Experience replaced", body = UserSelfResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(count = payload.experience.len()))]
pub async fn set_my_experience(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    AppJson(payload): AppJson<SetExperienceRequest>,
) -> Result<Json<UserSelfResponse>, AppError> {
    let actor =
        rule(Resource::User, Action::SetCollection).authorize_actor(auth_user.as_ref())?;
    validate_experience(&payload.experience)?;

    let txn = state.db.begin().await?;
    find_user_for_update(&txn, actor.user_id).await?;
    set_experience(&txn, actor.user_id, &payload.experience).await?;
    txn.commit().await?;

    let model = find_user(&state.db, actor.user_id).await?;
    Ok(Json(self_view(&state.db, model).await?))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    operation_id = "getUser",
    summary = "Get a user by ID",
    description = "Returns the full profile to the user themself and to administrators, the public profile to everyone else.",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_user(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let retrieve = rule(Resource::User, Action::Retrieve);
    let actor = retrieve.authorize_actor(auth_user.as_ref())?;

    let model = find_user(&state.db, id).await?;
    retrieve.authorize_object(Some(actor), model.id)?;

    if actor.user_id == model.id || actor.is_admin() {
        Ok(Json(UserResponse::Full(self_view(&state.db, model).await?)))
    } else {
        Ok(Json(UserResponse::Public(model.into())))
    }
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Users",
    operation_id = "updateUser",
    summary = "Update a user by ID",
    description = "Only the user themself may update their profile.",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserSelfResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the profile owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User or skill not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_user(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<UserSelfResponse>, AppError> {
    let actor = rule(Resource::User, Action::Update).authorize_actor(auth_user.as_ref())?;
    apply_update(&state, actor, id, payload).await
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Users",
    operation_id = "deleteUser",
    summary = "Delete a user by ID",
    description = "Only the user themself may delete their account. Deletes their experience, skill links and authored projects with all positions.",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the account owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_user(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let destroy = rule(Resource::User, Action::Destroy);
    let actor = destroy.authorize_actor(auth_user.as_ref())?;

    let txn = state.db.begin().await?;
    let target = find_user_for_update(&txn, id).await?;
    destroy.authorize_object(Some(actor), target.id)?;

    delete_user_cascade(&txn, target.id).await?;
    txn.commit().await?;

    tracing::info!(user_id = %id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn apply_update(
    state: &AppState,
    actor: &AuthUser,
    id: Uuid,
    payload: UpdateUserRequest,
) -> Result<Json<UserSelfResponse>, AppError> {
    validate_update_user(&payload)?;

    let txn = state.db.begin().await?;
    let existing = find_user_for_update(&txn, id).await?;
    rule(Resource::User, Action::Update).authorize_object(Some(actor), existing.id)?;

    if payload.touches_profile() {
        if let Some(Some(ref telegram)) = payload.telegram {
            ensure_telegram_free(&txn, telegram.trim(), existing.id).await?;
        }

        let mut active: user::ActiveModel = existing.into();
        let nullable = [
            (&mut active.telegram, payload.telegram),
            (&mut active.avatar, payload.avatar),
            (&mut active.github, payload.github),
            (&mut active.linkedin, payload.linkedin),
            (&mut active.resume, payload.resume),
            (&mut active.info, payload.info),
        ];
        for (column, value) in nullable {
            if let Some(value) = value {
                *column = Set(normalize_optional(value));
            }
        }
        if let Some(role) = payload.role_id {
            active.role_id = Set(role);
        }
        if let Some(grade) = payload.grade_id {
            active.grade_id = Set(grade);
        }
        active.update(&txn).await?;
    }

    if let Some(ref skills_ids) = payload.skills_ids {
        set_skills(&txn, id, skills_ids).await?;
    }
    if let Some(ref entries) = payload.experience {
        set_experience(&txn, id, entries).await?;
    }
    txn.commit().await?;

    let model = find_user(&state.db, id).await?;
    Ok(Json(self_view(&state.db, model).await?))
}
