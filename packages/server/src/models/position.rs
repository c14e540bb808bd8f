use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::choice::{Grade, Role};
use crate::entity::{project, project_position};
use crate::error::AppError;

use super::project::{default_count_needed, validate_count_needed};
use super::shared::Pagination;
use super::user::UserPublicResponse;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreatePositionRequest {
    /// Project the position belongs to. Only its author may add positions.
    pub project_id: Uuid,
    #[serde(default)]
    pub role_id: Role,
    #[serde(default)]
    pub grade_id: Grade,
    #[serde(default = "default_count_needed")]
    #[schema(example = 1, minimum = 1)]
    pub count_needed: i32,
}

/// Position patch. A position cannot be moved to another project.
#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdatePositionRequest {
    pub role_id: Option<Role>,
    pub grade_id: Option<Grade>,
    pub count_needed: Option<i32>,
}

/// Standalone position view, with the owning project and its author.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PositionResponse {
    pub id: Uuid,
    pub role_id: Role,
    #[schema(example = "Backend Developer")]
    pub role_display: &'static str,
    pub grade_id: Grade,
    #[schema(example = "Junior")]
    pub grade_display: &'static str,
    pub count_needed: i32,
    pub project_id: Uuid,
    #[schema(example = "Garden App")]
    pub project_name: String,
    pub author: UserPublicResponse,
}

impl PositionResponse {
    pub fn new(
        m: project_position::Model,
        project: &project::Model,
        author: UserPublicResponse,
    ) -> Self {
        Self {
            id: m.id,
            role_id: m.role_id,
            role_display: m.role_id.label(),
            grade_id: m.grade_id,
            grade_display: m.grade_id.label(),
            count_needed: m.count_needed,
            project_id: project.id,
            project_name: project.name.clone(),
            author,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PositionListResponse {
    pub data: Vec<PositionResponse>,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PositionListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    #[param(value_type = Option<Role>)]
    pub role_id: Option<Role>,
    #[param(value_type = Option<Grade>)]
    pub grade_id: Option<Grade>,
    /// Only positions of this project.
    pub project: Option<Uuid>,
}

pub fn validate_create_position(req: &CreatePositionRequest) -> Result<(), AppError> {
    validate_count_needed(req.count_needed)
}

pub fn validate_update_position(req: &UpdatePositionRequest) -> Result<(), AppError> {
    if let Some(count) = req.count_needed {
        validate_count_needed(count)?;
    }
    Ok(())
}
