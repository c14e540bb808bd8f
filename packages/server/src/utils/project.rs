use std::collections::HashMap;

use sea_orm::sea_query::LockType;
use sea_orm::*;
use uuid::Uuid;

use crate::entity::{project, project_position, project_stack, stack, user};
use crate::error::AppError;
use crate::models::position::PositionResponse;
use crate::models::project::{PositionInput, ProjectPositionResponse, ProjectResponse};
use crate::models::shared::unique_ids;
use crate::models::stack::StackResponse;
use crate::models::user::UserPublicResponse;

pub async fn find_project<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<project::Model, AppError> {
    project::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))
}

pub async fn find_project_for_update(
    txn: &DatabaseTransaction,
    id: Uuid,
) -> Result<project::Model, AppError> {
    project::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))
}

pub async fn find_position<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<project_position::Model, AppError> {
    project_position::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Position not found".into()))
}

pub async fn find_position_for_update(
    txn: &DatabaseTransaction,
    id: Uuid,
) -> Result<project_position::Model, AppError> {
    project_position::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Position not found".into()))
}

async fn authors_by_id<C: ConnectionTrait>(
    db: &C,
    ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, UserPublicResponse>, AppError> {
    let ids = unique_ids(&ids.into_iter().collect::<Vec<_>>());
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(users.into_iter().map(|u| (u.id, u.into())).collect())
}

fn author_of(
    authors: &HashMap<Uuid, UserPublicResponse>,
    id: Uuid,
) -> Result<UserPublicResponse, AppError> {
    authors
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError::Internal(format!("Author {id} missing")))
}

/// Build read shapes for a page of projects with a fixed number of queries.
pub async fn project_views<C: ConnectionTrait>(
    db: &C,
    projects: Vec<project::Model>,
) -> Result<Vec<ProjectResponse>, AppError> {
    if projects.is_empty() {
        return Ok(Vec::new());
    }
    let project_ids: Vec<Uuid> = projects.iter().map(|p| p.id).collect();

    let authors = authors_by_id(db, projects.iter().map(|p| p.author_id)).await?;

    let mut positions: HashMap<Uuid, Vec<ProjectPositionResponse>> = HashMap::new();
    for position in project_position::Entity::find()
        .filter(project_position::Column::ProjectId.is_in(project_ids.clone()))
        .order_by_asc(project_position::Column::Id)
        .all(db)
        .await?
    {
        positions
            .entry(position.project_id)
            .or_default()
            .push(position.into());
    }

    let links = project_stack::Entity::find()
        .filter(project_stack::Column::ProjectId.is_in(project_ids))
        .all(db)
        .await?;
    let stack_ids = unique_ids(&links.iter().map(|l| l.stack_id).collect::<Vec<_>>());
    let stacks: HashMap<Uuid, stack::Model> = if stack_ids.is_empty() {
        HashMap::new()
    } else {
        stack::Entity::find()
            .filter(stack::Column::Id.is_in(stack_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect()
    };
    let mut stacks_by_project: HashMap<Uuid, Vec<StackResponse>> = HashMap::new();
    for link in links {
        if let Some(s) = stacks.get(&link.stack_id) {
            stacks_by_project
                .entry(link.project_id)
                .or_default()
                .push(s.clone().into());
        }
    }

    projects
        .into_iter()
        .map(|p| {
            let author = author_of(&authors, p.author_id)?;
            let positions = positions.remove(&p.id).unwrap_or_default();
            let mut stacks = stacks_by_project.remove(&p.id).unwrap_or_default();
            stacks.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(ProjectResponse::new(p, author, positions, stacks))
        })
        .collect()
}

pub async fn project_view<C: ConnectionTrait>(
    db: &C,
    project: project::Model,
) -> Result<ProjectResponse, AppError> {
    project_views(db, vec![project])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("Project view missing".into()))
}

pub async fn position_views<C: ConnectionTrait>(
    db: &C,
    positions: Vec<project_position::Model>,
) -> Result<Vec<PositionResponse>, AppError> {
    if positions.is_empty() {
        return Ok(Vec::new());
    }
    let project_ids = unique_ids(&positions.iter().map(|p| p.project_id).collect::<Vec<_>>());
    let projects: HashMap<Uuid, project::Model> = project::Entity::find()
        .filter(project::Column::Id.is_in(project_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();
    let authors = authors_by_id(db, projects.values().map(|p| p.author_id)).await?;

    positions
        .into_iter()
        .map(|position| {
            let project = projects.get(&position.project_id).ok_or_else(|| {
                AppError::Internal(format!("Project {} missing", position.project_id))
            })?;
            let author = author_of(&authors, project.author_id)?;
            Ok(PositionResponse::new(position, project, author))
        })
        .collect()
}

pub async fn position_view<C: ConnectionTrait>(
    db: &C,
    position: project_position::Model,
) -> Result<PositionResponse, AppError> {
    position_views(db, vec![position])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("Position view missing".into()))
}

/// Replace every position of a project.
pub async fn set_positions(
    txn: &DatabaseTransaction,
    project_id: Uuid,
    positions: &[PositionInput],
) -> Result<(), AppError> {
    project_position::Entity::delete_many()
        .filter(project_position::Column::ProjectId.eq(project_id))
        .exec(txn)
        .await?;

    for p in positions {
        project_position::ActiveModel {
            id: Set(Uuid::now_v7()),
            role_id: Set(p.role_id),
            grade_id: Set(p.grade_id),
            count_needed: Set(p.count_needed),
            project_id: Set(project_id),
        }
        .insert(txn)
        .await?;
    }
    Ok(())
}

/// Replace the stack set of a project. Unknown ids fail the whole call.
pub async fn set_stacks(
    txn: &DatabaseTransaction,
    project_id: Uuid,
    stacks_ids: &[Uuid],
) -> Result<(), AppError> {
    let ids = unique_ids(stacks_ids);

    if !ids.is_empty() {
        let found = stack::Entity::find()
            .filter(stack::Column::Id.is_in(ids.iter().copied()))
            .count(txn)
            .await?;
        if found != ids.len() as u64 {
            return Err(AppError::NotFound("Stack not found".into()));
        }
    }

    project_stack::Entity::delete_many()
        .filter(project_stack::Column::ProjectId.eq(project_id))
        .exec(txn)
        .await?;

    for stack_id in ids {
        project_stack::ActiveModel {
            project_id: Set(project_id),
            stack_id: Set(stack_id),
        }
        .insert(txn)
        .await?;
    }
    Ok(())
}

pub async fn delete_project_cascade(
    txn: &DatabaseTransaction,
    project_id: Uuid,
) -> Result<(), AppError> {
    project_stack::Entity::delete_many()
        .filter(project_stack::Column::ProjectId.eq(project_id))
        .exec(txn)
        .await?;
    project_position::Entity::delete_many()
        .filter(project_position::Column::ProjectId.eq(project_id))
        .exec(txn)
        .await?;
    project::Entity::delete_by_id(project_id).exec(txn).await?;
    Ok(())
}
