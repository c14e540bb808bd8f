use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{skill, user_skill};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::skill::*;
use crate::policy::{Action, Resource, rule};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Skills",
    operation_id = "listSkills",
    summary = "List skills",
    description = "All skills ordered by name. Administrators only.",
    responses(
        (status = 200, description = "List of skills", body = Vec<SkillResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_skills(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
) -> Result<Json<Vec<SkillResponse>>, AppError> {
    rule(Resource::Skill, Action::List).authorize(auth_user.as_ref())?;

    let skills = skill::Entity::find()
        .order_by_asc(skill::Column::Name)
        .all(&state.db)
        .await?;
    Ok(Json(skills.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Skills",
    operation_id = "createSkill",
    summary = "Create a skill",
    request_body = CreateSkillRequest,
    responses(
        (status = 201, description = "Skill created", body = SkillResponse),
        (status = 400, description = "Validation error or duplicate code (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(code = %payload.code))]
pub async fn create_skill(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateSkillRequest>,
) -> Result<impl IntoResponse, AppError> {
    rule(Resource::Skill, Action::Create).authorize(auth_user.as_ref())?;
    validate_create_skill(&payload)?;

    let code = payload.code.trim().to_string();

    let txn = state.db.begin().await?;
    ensure_code_free(&txn, &code, None).await?;
    let model = skill::ActiveModel {
        id: Set(Uuid::now_v7()),
        code: Set(code),
        name: Set(payload.name.trim().to_string()),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(SkillResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Skills",
    operation_id = "getSkill",
    summary = "Get a skill by ID",
    params(("id" = Uuid, Path, description = "Skill ID")),
    responses(
        (status = 200, description = "Skill", body = SkillResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Skill not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_skill(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SkillResponse>, AppError> {
    rule(Resource::Skill, Action::Retrieve).authorize(auth_user.as_ref())?;
    Ok(Json(find_skill(&state.db, id).await?.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Skills",
    operation_id = "updateSkill",
    summary = "Update a skill",
    params(("id" = Uuid, Path, description = "Skill ID")),
    request_body = UpdateSkillRequest,
    responses(
        (status = 200, description = "Skill updated", body = SkillResponse),
        (status = 400, description = "Validation error or duplicate code (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Skill not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_skill(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateSkillRequest>,
) -> Result<Json<SkillResponse>, AppError> {
    rule(Resource::Skill, Action::Update).authorize(auth_user.as_ref())?;
    validate_update_skill(&payload)?;

    if payload == UpdateSkillRequest::default() {
        return Ok(Json(find_skill(&state.db, id).await?.into()));
    }

    let txn = state.db.begin().await?;
    let existing = skill::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Skill not found".into()))?;

    let mut active: skill::ActiveModel = existing.into();
    if let Some(ref code) = payload.code {
        let code = code.trim().to_string();
        ensure_code_free(&txn, &code, Some(id)).await?;
        active.code = Set(code);
    }
    if let Some(ref name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Skills",
    operation_id = "deleteSkill",
    summary = "Delete a skill",
    description = "Also removes the skill from every user profile.",
    params(("id" = Uuid, Path, description = "Skill ID")),
    responses(
        (status = 204, description = "Skill deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Skill not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_skill(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    rule(Resource::Skill, Action::Destroy).authorize(auth_user.as_ref())?;

    let txn = state.db.begin().await?;
    find_skill(&txn, id).await?;
    user_skill::Entity::delete_many()
        .filter(user_skill::Column::SkillId.eq(id))
        .exec(&txn)
        .await?;
    skill::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn find_skill<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<skill::Model, AppError> {
    skill::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Skill not found".into()))
}

async fn ensure_code_free<C: ConnectionTrait>(
    db: &C,
    code: &str,
    except: Option<Uuid>,
) -> Result<(), AppError> {
    let mut select = skill::Entity::find().filter(skill::Column::Code.eq(code));
    if let Some(id) = except {
        select = select.filter(skill::Column::Id.ne(id));
    }
    if select.count(db).await? > 0 {
        return Err(AppError::field(
            "code",
            "A skill with this code already exists",
        ));
    }
    Ok(())
}
