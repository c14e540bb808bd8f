use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::choice::{Grade, Role};
use crate::entity::{project, project_position};
use crate::error::AppError;

use super::shared::{Pagination, double_option, validate_id_set, validate_length};
use super::stack::StackResponse;
use super::user::UserPublicResponse;

pub const MAX_POSITIONS: usize = 50;
pub const MAX_STACKS: usize = 50;
pub const MAX_COUNT_NEEDED: i32 = 100;

/// An open slot on a project, as submitted inside a project write.
#[derive(Clone, Debug, Deserialize, PartialEq, utoipa::ToSchema)]
pub struct PositionInput {
    #[serde(default)]
    pub role_id: Role,
    #[serde(default)]
    pub grade_id: Grade,
    #[serde(default = "default_count_needed")]
    #[schema(example = 2, minimum = 1)]
    pub count_needed: i32,
}

pub fn default_count_needed() -> i32 {
    1
}

/// Position as embedded in a project read shape.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectPositionResponse {
    pub id: Uuid,
    pub role_id: Role,
    #[schema(example = "Backend Developer")]
    pub role_display: &'static str,
    pub grade_id: Grade,
    #[schema(example = "Junior")]
    pub grade_display: &'static str,
    pub count_needed: i32,
}

impl From<project_position::Model> for ProjectPositionResponse {
    fn from(m: project_position::Model) -> Self {
        Self {
            id: m.id,
            role_id: m.role_id,
            role_display: m.role_id.label(),
            grade_id: m.grade_id,
            grade_display: m.grade_id.label(),
            count_needed: m.count_needed,
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateProjectRequest {
    #[schema(example = "Garden App")]
    pub name: String,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stacks_ids: Vec<Uuid>,
    #[serde(default)]
    pub positions_data: Vec<PositionInput>,
}

/// Project patch. The author is fixed at creation and cannot be changed here.
#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub github: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    /// Replaces the stack set when present.
    pub stacks_ids: Option<Vec<Uuid>>,
    /// Replaces every position when present; `[]` removes them all.
    pub positions_data: Option<Vec<PositionInput>>,
}

impl UpdateProjectRequest {
    pub fn touches_project(&self) -> bool {
        self.name.is_some() || self.github.is_some() || self.description.is_some()
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SetPositionsRequest {
    pub positions_data: Vec<PositionInput>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SetStacksRequest {
    pub stacks_ids: Vec<Uuid>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectResponse {
    pub id: Uuid,
    pub name: String,
    pub github: Option<String>,
    pub description: Option<String>,
    pub author: UserPublicResponse,
    pub created_at: DateTime<Utc>,
    pub positions: Vec<ProjectPositionResponse>,
    pub stacks: Vec<StackResponse>,
}

impl ProjectResponse {
    pub fn new(
        m: project::Model,
        author: UserPublicResponse,
        positions: Vec<ProjectPositionResponse>,
        stacks: Vec<StackResponse>,
    ) -> Self {
        Self {
            id: m.id,
            name: m.name,
            github: m.github,
            description: m.description,
            author,
            created_at: m.created_at,
            positions,
            stacks,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectListResponse {
    pub data: Vec<ProjectResponse>,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ProjectListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Only projects tagged with this stack.
    pub stack: Option<Uuid>,
    /// Only projects with an open position of this role.
    #[param(value_type = Option<Role>)]
    pub role_id: Option<Role>,
    /// Only projects with an open position of this grade.
    #[param(value_type = Option<Grade>)]
    pub grade_id: Option<Grade>,
    /// Case-insensitive match on name, description or author username.
    pub search: Option<String>,
}

pub fn validate_count_needed(count: i32) -> Result<(), AppError> {
    if !(1..=MAX_COUNT_NEEDED).contains(&count) {
        return Err(AppError::field(
            "count_needed",
            format!("count_needed must be 1-{MAX_COUNT_NEEDED}"),
        ));
    }
    Ok(())
}

pub fn validate_positions(positions: &[PositionInput]) -> Result<(), AppError> {
    if positions.len() > MAX_POSITIONS {
        return Err(AppError::field(
            "positions_data",
            format!("At most {MAX_POSITIONS} positions"),
        ));
    }
    positions
        .iter()
        .try_for_each(|p| validate_count_needed(p.count_needed))
}

pub fn validate_stacks_ids(ids: &[Uuid]) -> Result<(), AppError> {
    validate_id_set(ids, "stacks_ids", MAX_STACKS)
}

fn validate_github(github: &str) -> Result<(), AppError> {
    if github.chars().count() > 255 {
        return Err(AppError::field(
            "github",
            "github must be at most 255 characters",
        ));
    }
    Ok(())
}

pub fn validate_create_project(req: &CreateProjectRequest) -> Result<(), AppError> {
    validate_length("name", &req.name, 1, 255)?;
    if let Some(ref github) = req.github {
        validate_github(github)?;
    }
    validate_stacks_ids(&req.stacks_ids)?;
    validate_positions(&req.positions_data)
}

pub fn validate_update_project(req: &UpdateProjectRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_length("name", name, 1, 255)?;
    }
    if let Some(Some(ref github)) = req.github {
        validate_github(github)?;
    }
    if let Some(ref ids) = req.stacks_ids {
        validate_stacks_ids(ids)?;
    }
    if let Some(ref positions) = req.positions_data {
        validate_positions(positions)?;
    }
    Ok(())
}
