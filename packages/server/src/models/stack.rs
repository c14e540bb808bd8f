use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::stack;
use crate::error::AppError;

use super::shared::validate_length;

/// Create or rename a stack tag.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct StackRequest {
    #[schema(example = "Rust")]
    pub name: String,
}

#[derive(Clone, Serialize, utoipa::ToSchema)]
pub struct StackResponse {
    pub id: Uuid,
    #[schema(example = "Rust")]
    pub name: String,
}

impl From<stack::Model> for StackResponse {
    fn from(m: stack::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct StackListQuery {
    /// Case-insensitive substring match on the name.
    pub search: Option<String>,
}

pub fn validate_stack_request(req: &StackRequest) -> Result<(), AppError> {
    validate_length("name", &req.name, 1, 100)
}
