use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::skill;
use crate::error::AppError;

use super::shared::validate_length;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateSkillRequest {
    /// Stable machine key, unique.
    #[schema(example = "rust")]
    pub code: String,
    #[schema(example = "Rust")]
    pub name: String,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateSkillRequest {
    pub code: Option<String>,
    pub name: Option<String>,
}

#[derive(Clone, Serialize, utoipa::ToSchema)]
pub struct SkillResponse {
    pub id: Uuid,
    #[schema(example = "rust")]
    pub code: String,
    #[schema(example = "Rust")]
    pub name: String,
}

impl From<skill::Model> for SkillResponse {
    fn from(m: skill::Model) -> Self {
        Self {
            id: m.id,
            code: m.code,
            name: m.name,
        }
    }
}

fn validate_code(code: &str) -> Result<(), AppError> {
    validate_length("code", code, 1, 50)?;
    if code.trim().chars().any(char::is_whitespace) {
        return Err(AppError::field("code", "code must not contain spaces"));
    }
    Ok(())
}

pub fn validate_create_skill(req: &CreateSkillRequest) -> Result<(), AppError> {
    validate_code(&req.code)?;
    validate_length("name", &req.name, 1, 100)
}

pub fn validate_update_skill(req: &UpdateSkillRequest) -> Result<(), AppError> {
    if let Some(ref code) = req.code {
        validate_code(code)?;
    }
    if let Some(ref name) = req.name {
        validate_length("name", name, 1, 100)?;
    }
    Ok(())
}
