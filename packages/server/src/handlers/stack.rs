use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{project_stack, stack};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::query::AppQuery;
use crate::models::shared::icontains;
use crate::models::stack::*;
use crate::policy::{Action, Resource, rule};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Stacks",
    operation_id = "listStacks",
    summary = "List stack tags",
    description = "All stacks ordered by name, optionally filtered by a case-insensitive `search` on the name. Open to anonymous callers.",
    params(StackListQuery),
    responses(
        (status = 200, description = "List of stacks", body = Vec<StackResponse>),
    ),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_stacks(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<StackListQuery>,
) -> Result<Json<Vec<StackResponse>>, AppError> {
    rule(Resource::Stack, Action::List).authorize(auth_user.as_ref())?;

    let mut select = stack::Entity::find();
    if let Some(cond) = query
        .search
        .as_deref()
        .and_then(|s| icontains(stack::Column::Name, s))
    {
        select = select.filter(cond);
    }
    let stacks = select
        .order_by_asc(stack::Column::Name)
        .all(&state.db)
        .await?;
    Ok(Json(stacks.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Stacks",
    operation_id = "createStack",
    summary = "Create a stack tag",
    request_body = StackRequest,
    responses(
        (status = 201, description = "Stack created", body = StackResponse),
        (status = 400, description = "Validation error or duplicate name (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_stack(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    AppJson(payload): AppJson<StackRequest>,
) -> Result<impl IntoResponse, AppError> {
    rule(Resource::Stack, Action::Create).authorize(auth_user.as_ref())?;
    validate_stack_request(&payload)?;

    let name = payload.name.trim().to_string();

    let txn = state.db.begin().await?;
    ensure_name_free(&txn, &name, None).await?;
    let model = stack::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set(name),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(StackResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Stacks",
    operation_id = "getStack",
    summary = "Get a stack tag by ID",
    params(("id" = Uuid, Path, description = "Stack ID")),
    responses(
        (status = 200, description = "Stack", body = StackResponse),
        (status = 404, description = "Stack not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_stack(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StackResponse>, AppError> {
    rule(Resource::Stack, Action::Retrieve).authorize(auth_user.as_ref())?;
    Ok(Json(find_stack(&state.db, id).await?.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Stacks",
    operation_id = "updateStack",
    summary = "Rename a stack tag",
    params(("id" = Uuid, Path, description = "Stack ID")),
    request_body = StackRequest,
    responses(
        (status = 200, description = "Stack updated", body = StackResponse),
        (status = 400, description = "Validation error or duplicate name (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Stack not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_stack(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<StackRequest>,
) -> Result<Json<StackResponse>, AppError> {
    rule(Resource::Stack, Action::Update).authorize(auth_user.as_ref())?;
    validate_stack_request(&payload)?;

    let name = payload.name.trim().to_string();

    let txn = state.db.begin().await?;
    let existing = stack::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Stack not found".into()))?;
    ensure_name_free(&txn, &name, Some(id)).await?;

    let mut active: stack::ActiveModel = existing.into();
    active.name = Set(name);
    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Stacks",
    operation_id = "deleteStack",
    summary = "Delete a stack tag",
    description = "Detaches the stack from every project; the projects themselves are kept.",
    params(("id" = Uuid, Path, description = "Stack ID")),
    responses(
        (status = 204, description = "Stack deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Stack not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_stack(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    rule(Resource::Stack, Action::Destroy).authorize(auth_user.as_ref())?;

    let txn = state.db.begin().await?;
    find_stack(&txn, id).await?;
    project_stack::Entity::delete_many()
        .filter(project_stack::Column::StackId.eq(id))
        .exec(&txn)
        .await?;
    stack::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn find_stack<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<stack::Model, AppError> {
    stack::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stack not found".into()))
}

async fn ensure_name_free<C: ConnectionTrait>(
    db: &C,
    name: &str,
    except: Option<Uuid>,
) -> Result<(), AppError> {
    let mut select = stack::Entity::find().filter(stack::Column::Name.eq(name));
    if let Some(id) = except {
        select = select.filter(stack::Column::Id.ne(id));
    }
    if select.count(db).await? > 0 {
        return Err(AppError::field(
            "name",
            "A stack with this name already exists",
        ));
    }
    Ok(())
}
