use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::choice::{Grade, Role};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project_position")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub role_id: Role,
    pub grade_id: Grade,
    #[sea_orm(default_value = 1)]
    pub count_needed: i32,

    pub project_id: Uuid,
    #[sea_orm(belongs_to, from = "project_id", to = "id", on_delete = "Cascade")]
    pub project: HasOne<super::project::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
