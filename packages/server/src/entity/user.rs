use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::choice::{Grade, Role};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,

    #[sea_orm(unique)]
    pub telegram: Option<String>,
    pub avatar: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub resume: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub info: Option<String>,

    pub role_id: Role,
    pub grade_id: Grade,

    #[sea_orm(default_value = false)]
    pub is_staff: bool,
    #[sea_orm(default_value = true)]
    pub is_active: bool,

    #[sea_orm(has_many)]
    pub projects: HasMany<super::project::Entity>,

    #[sea_orm(has_many)]
    pub experience: HasMany<super::experience::Entity>,

    #[sea_orm(has_many, via = "user_skill")]
    pub skills: HasMany<super::skill::Entity>,

    pub date_joined: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
