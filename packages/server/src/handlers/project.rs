use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{project, project_position, project_stack, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::query::AppQuery;
use crate::models::project::*;
use crate::models::shared::{Pagination, icontains, normalize_optional, page_params};
use crate::policy::{Action, Resource, rule};
use crate::state::AppState;
use crate::utils::project::{
    delete_project_cascade, find_project, find_project_for_update, project_view, project_views,
    set_positions, set_stacks,
};

#[utoipa::path(
    get,
    path = "/",
    tag = "Projects",
    operation_id = "listProjects",
    summary = "List projects",
    description = "Newest first. `stack` keeps projects tagged with that stack; `role_id` and `grade_id` keep projects having one position that matches both; `search` matches name, description or author username, case-insensitively. Open to anonymous callers.",
    params(ProjectListQuery),
    responses(
        (status = 200, description = "List of projects", body = ProjectListResponse),
        (status = 400, description = "Invalid query (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_projects(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProjectListQuery>,
) -> Result<Json<ProjectListResponse>, AppError> {
    rule(Resource::Project, Action::List).authorize(auth_user.as_ref())?;

    let (page, per_page) = page_params(query.page, query.per_page);

    let mut select = project::Entity::find();

    if let Some(stack_id) = query.stack {
        select = select.filter(
            project::Column::Id.in_subquery(
                SeaQuery::select()
                    .column(project_stack::Column::ProjectId)
                    .from(project_stack::Entity)
                    .and_where(project_stack::Column::StackId.eq(stack_id))
                    .to_owned(),
            ),
        );
    }

    if query.role_id.is_some() || query.grade_id.is_some() {
        let mut positions = SeaQuery::select();
        positions
            .column(project_position::Column::ProjectId)
            .from(project_position::Entity);
        if let Some(role) = query.role_id {
            positions.and_where(project_position::Column::RoleId.eq(role));
        }
        if let Some(grade) = query.grade_id {
            positions.and_where(project_position::Column::GradeId.eq(grade));
        }
        select = select.filter(project::Column::Id.in_subquery(positions.to_owned()));
    }

    if let Some(search) = query.search.as_deref()
        && let (Some(by_name), Some(by_description), Some(by_username)) = (
            icontains(project::Column::Name, search),
            icontains(project::Column::Description, search),
            icontains(user::Column::Username, search),
        )
    {
        select = select.filter(
            Condition::any().add(by_name).add(by_description).add(
                project::Column::AuthorId.in_subquery(
                    SeaQuery::select()
                        .column(user::Column::Id)
                        .from(user::Entity)
                        .cond_where(by_username)
                        .to_owned(),
                ),
            ),
        );
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let projects = select
        .order_by_desc(project::Column::CreatedAt)
        .order_by_desc(project::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    Ok(Json(ProjectListResponse {
        data: project_views(&state.db, projects).await?,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/mine",
    tag = "Projects",
    operation_id = "listMyProjects",
    summary = "Projects authored by the caller",
    responses(
        (status = 200, description = "Own projects, newest first", body = Vec<ProjectResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_my_projects(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectResponse>>, AppError> {
    let actor = rule(Resource::Project, Action::Mine).authorize_actor(auth_user.as_ref())?;

    let projects = project::Entity::find()
        .filter(project::Column::AuthorId.eq(actor.user_id))
        .order_by_desc(project::Column::CreatedAt)
        .order_by_desc(project::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(project_views(&state.db, projects).await?))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Projects",
    operation_id = "createProject",
    summary = "Create a project",
    description = "The caller becomes the author; any `author` in the body is ignored. Positions and stacks are created in the same transaction as the project.",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Stack not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_project(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateProjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    let actor = rule(Resource::Project, Action::Create).authorize_actor(auth_user.as_ref())?;
    validate_create_project(&payload)?;

    let txn = state.db.begin().await?;
    let model = project::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set(payload.name.trim().to_string()),
        github: Set(normalize_optional(payload.github)),
        description: Set(normalize_optional(payload.description)),
        author_id: Set(actor.user_id),
        created_at: Set(chrono::Utc::now()),
    }
    .insert(&txn)
    .await?;

    set_positions(&txn, model.id, &payload.positions_data).await?;
    set_stacks(&txn, model.id, &payload.stacks_ids).await?;
    txn.commit().await?;

    tracing::info!(project_id = %model.id, "Project created");
    let view = project_view(&state.db, model).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Projects",
    operation_id = "getProject",
    summary = "Get a project by ID",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project", body = ProjectResponse),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_project(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectResponse>, AppError> {
    let retrieve = rule(Resource::Project, Action::Retrieve);
    let actor = retrieve.authorize(auth_user.as_ref())?;

    let model = find_project(&state.db, id).await?;
    retrieve.authorize_object(actor, model.author_id)?;

    Ok(Json(project_view(&state.db, model).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Projects",
    operation_id = "updateProject",
    summary = "Update a project",
    description = "Author only. PATCH semantics for scalar fields; `positions_data` and `stacks_ids`, when present, replace the whole collection (an empty list removes all).",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = ProjectResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project or stack not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_project(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateProjectRequest>,
) -> Result<Json<ProjectResponse>, AppError> {
    let update = rule(Resource::Project, Action::Update);
    let actor = update.authorize_actor(auth_user.as_ref())?;
    validate_update_project(&payload)?;

    let txn = state.db.begin().await?;
    let existing = find_project_for_update(&txn, id).await?;
    update.authorize_object(Some(actor), existing.author_id)?;

    if payload.touches_project() {
        let mut active: project::ActiveModel = existing.into();
        if let Some(ref name) = payload.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(github) = payload.github {
            active.github = Set(normalize_optional(github));
        }
        if let Some(description) = payload.description {
            active.description = Set(normalize_optional(description));
        }
        active.update(&txn).await?;
    }

    if let Some(ref positions) = payload.positions_data {
        set_positions(&txn, id, positions).await?;
    }
    if let Some(ref stacks_ids) = payload.stacks_ids {
        set_stacks(&txn, id, stacks_ids).await?;
    }
    txn.commit().await?;

    let model = find_project(&state.db, id).await?;
    Ok(Json(project_view(&state.db, model).await?))
}

#[utoipa::path(
    put,
    path = "/{id}/positions",
    tag = "Projects",
    operation_id = "setProjectPositions",
    summary = "Replace all positions of a project",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = SetPositionsRequest,
    responses(
        (status = 200, description = "Positions replaced", body = ProjectResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(count = payload.positions_data.len()))]
pub async fn set_project_positions(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<SetPositionsRequest>,
) -> Result<Json<ProjectResponse>, AppError> {
    let set = rule(Resource::Project, Action::SetCollection);
    let actor = set.authorize_actor(auth_user.as_ref())?;
    validate_positions(&payload.positions_data)?;

    let txn = state.db.begin().await?;
    let existing = find_project_for_update(&txn, id).await?;
    set.authorize_object(Some(actor), existing.author_id)?;
    set_positions(&txn, id, &payload.positions_data).await?;
    txn.commit().await?;

    Ok(Json(project_view(&state.db, existing).await?))
}

#[utoipa::path(
    put,
    path = "/{id}/stacks",
    tag = "Projects",
    operation_id = "setProjectStacks",
    summary = "Replace the stack set of a project",
    description = "Duplicate ids collapse. An empty list detaches every stack.",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = SetStacksRequest,
    responses(
        (status = 200, description = "Stacks replaced", body = ProjectResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project or stack not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(count = payload.stacks_ids.len()))]
pub async fn set_project_stacks(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<SetStacksRequest>,
) -> Result<Json<ProjectResponse>, AppError> {
    let set = rule(Resource::Project, Action::SetCollection);
    let actor = set.authorize_actor(auth_user.as_ref())?;
    validate_stacks_ids(&payload.stacks_ids)?;

    let txn = state.db.begin().await?;
    let existing = find_project_for_update(&txn, id).await?;
    set.authorize_object(Some(actor), existing.author_id)?;
    set_stacks(&txn, id, &payload.stacks_ids).await?;
    txn.commit().await?;

    Ok(Json(project_view(&state.db, existing).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Projects",
    operation_id = "deleteProject",
    summary = "Delete a project",
    description = "Author only. Deletes the project's positions and stack links with it.",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_project(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let destroy = rule(Resource::Project, Action::Destroy);
    let actor = destroy.authorize_actor(auth_user.as_ref())?;

    let txn = state.db.begin().await?;
    let existing = find_project_for_update(&txn, id).await?;
    destroy.authorize_object(Some(actor), existing.author_id)?;
    delete_project_cascade(&txn, id).await?;
    txn.commit().await?;

    tracing::info!(project_id = %id, "Project deleted");
    Ok(StatusCode::NO_CONTENT)
}
