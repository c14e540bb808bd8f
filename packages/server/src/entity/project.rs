use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,
    pub github: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub description: Option<String>,

    /// Set from the acting user on creation, never from the request body.
    pub author_id: Uuid,
    #[sea_orm(belongs_to, from = "author_id", to = "id", on_delete = "Cascade")]
    pub author: HasOne<super::user::Entity>,

    #[sea_orm(has_many)]
    pub positions: HasMany<super::project_position::Entity>,

    #[sea_orm(has_many, via = "project_stack")]
    pub stacks: HasMany<super::stack::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
