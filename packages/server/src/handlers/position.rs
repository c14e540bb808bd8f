use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::project_position;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::query::AppQuery;
use crate::models::position::*;
use crate::models::shared::{Pagination, page_params};
use crate::policy::{Action, Resource, rule};
use crate::state::AppState;
use crate::utils::project::{
    find_position, find_position_for_update, find_project, find_project_for_update,
    position_view, position_views,
};

#[utoipa::path(
    get,
    path = "/",
    tag = "Positions",
    operation_id = "listPositions",
    summary = "List open positions",
    description = "Filter by `role_id`, `grade_id` and `project`. Open to anonymous callers.",
    params(PositionListQuery),
    responses(
        (status = 200, description = "List of positions", body = PositionListResponse),
        (status = 400, description = "Invalid query (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_positions(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PositionListQuery>,
) -> Result<Json<PositionListResponse>, AppError> {
    rule(Resource::Position, Action::List).authorize(auth_user.as_ref())?;

    let (page, per_page) = page_params(query.page, query.per_page);

    let mut select = project_position::Entity::find();
    if let Some(role) = query.role_id {
        select = select.filter(project_position::Column::RoleId.eq(role));
    }
    if let Some(grade) = query.grade_id {
        select = select.filter(project_position::Column::GradeId.eq(grade));
    }
    if let Some(project_id) = query.project {
        select = select.filter(project_position::Column::ProjectId.eq(project_id));
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let positions = select
        .order_by_desc(project_position::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    Ok(Json(PositionListResponse {
        data: position_views(&state.db, positions).await?,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Positions",
    operation_id = "createPosition",
    summary = "Open a position on a project",
    description = "Only the author of `project_id` may add positions.",
    request_body = CreatePositionRequest,
    responses(
        (status = 201, description = "Position created", body = PositionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the project author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(project_id = %payload.project_id))]
pub async fn create_position(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreatePositionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let create = rule(Resource::Position, Action::Create);
    let actor = create.authorize_actor(auth_user.as_ref())?;
    validate_create_position(&payload)?;

    let txn = state.db.begin().await?;
    let project = find_project_for_update(&txn, payload.project_id).await?;
    create.authorize_object(Some(actor), project.author_id)?;

    let model = project_position::ActiveModel {
        id: Set(Uuid::now_v7()),
        role_id: Set(payload.role_id),
        grade_id: Set(payload.grade_id),
        count_needed: Set(payload.count_needed),
        project_id: Set(project.id),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(position_view(&state.db, model).await?),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Positions",
    operation_id = "getPosition",
    summary = "Get a position by ID",
    params(("id" = Uuid, Path, description = "Position ID")),
    responses(
        (status = 200, description = "Position", body = PositionResponse),
        (status = 404, description = "Position not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_position(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PositionResponse>, AppError> {
    rule(Resource::Position, Action::Retrieve).authorize(auth_user.as_ref())?;
    let model = find_position(&state.db, id).await?;
    Ok(Json(position_view(&state.db, model).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Positions",
    operation_id = "updatePosition",
    summary = "Update a position",
    description = "Only the author of the owning project may update it. The owning project cannot be changed.",
    params(("id" = Uuid, Path, description = "Position ID")),
    request_body = UpdatePositionRequest,
    responses(
        (status = 200, description = "Position updated", body = PositionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the project author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Position not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_position(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdatePositionRequest>,
) -> Result<Json<PositionResponse>, AppError> {
    let update = rule(Resource::Position, Action::Update);
    let actor = update.authorize_actor(auth_user.as_ref())?;
    validate_update_position(&payload)?;

    let txn = state.db.begin().await?;
    let existing = find_position_for_update(&txn, id).await?;
    let project = find_project(&txn, existing.project_id).await?;
    update.authorize_object(Some(actor), project.author_id)?;

    let model = if payload == UpdatePositionRequest::default() {
        existing
    } else {
        let mut active: project_position::ActiveModel = existing.into();
        if let Some(role) = payload.role_id {
            active.role_id = Set(role);
        }
        if let Some(grade) = payload.grade_id {
            active.grade_id = Set(grade);
        }
        if let Some(count) = payload.count_needed {
            active.count_needed = Set(count);
        }
        active.update(&txn).await?
    };
    txn.commit().await?;

    Ok(Json(position_view(&state.db, model).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Positions",
    operation_id = "deletePosition",
    summary = "Delete a position",
    description = "Only the author of the owning project may delete it.",
    params(("id" = Uuid, Path, description = "Position ID")),
    responses(
        (status = 204, description = "Position deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the project author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Position not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_position(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let destroy = rule(Resource::Position, Action::Destroy);
    let actor = destroy.authorize_actor(auth_user.as_ref())?;

    let txn = state.db.begin().await?;
    let existing = find_position_for_update(&txn, id).await?;
    let project = find_project(&txn, existing.project_id).await?;
    destroy.authorize_object(Some(actor), project.author_id)?;

    project_position::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
