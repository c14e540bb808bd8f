use sea_orm::sea_query::{Index, OnConflict, PostgresQueryBuilder};
use sea_orm::*;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::AdminConfig;
use crate::entity::choice::{Grade, Role};
use crate::entity::{experience, project, project_position, user};
use crate::utils::hash;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Db(#[from] DbErr),
    #[error("password hash error: {0}")]
    Hash(argon2::password_hash::Error),
}

/// What [`ensure_admin`] did.
#[derive(Debug, PartialEq, Eq)]
pub enum AdminOutcome {
    Created,
    Unchanged,
    /// No password configured.
    Skipped,
    /// Another account already holds the configured username (and is not
    /// staff) or the configured email.
    /// It is left untouched and no administrator is created.
    Conflict { field: &'static str },
}

/// Make sure the configured administrative account exists.
///
/// Safe to run on every start: an existing staff account keeps its password
/// and profile. Staff status is only ever granted to an account this function
/// inserts itself, never to one found under the configured name.
pub async fn ensure_admin<C: ConnectionTrait>(
    db: &C,
    admin: &AdminConfig,
) -> Result<AdminOutcome, SeedError> {
    let existing = user::Entity::find()
        .filter(user::Column::Username.eq(&admin.username))
        .one(db)
        .await?;

    if let Some(existing) = existing {
        if existing.is_staff {
            return Ok(AdminOutcome::Unchanged);
        }
        return Ok(conflict("username", &admin.username));
    }

    let Some(ref password) = admin.password else {
        warn!(
            username = %admin.username,
            "No admin password configured (GROWHUB__ADMIN__PASSWORD), skipping admin bootstrap"
        );
        return Ok(AdminOutcome::Skipped);
    };

    let email = admin.email();
    let email_taken = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .count(db)
        .await?;
    if email_taken > 0 {
        return Ok(conflict("email", &email));
    }

    let model = user::ActiveModel {
        id: Set(Uuid::now_v7()),
        username: Set(admin.username.clone()),
        email: Set(email.clone()),
        password: Set(hash::hash_password(password).map_err(SeedError::Hash)?),
        role_id: Set(Role::NotSelected),
        grade_id: Set(Grade::NotSelected),
        is_staff: Set(true),
        is_active: Set(true),
        date_joined: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = user::Entity::insert(model)
        .on_conflict(
            OnConflict::column(user::Column::Username)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        // Another instance won the race.
        Ok(0) | Err(DbErr::RecordNotInserted) => Ok(AdminOutcome::Unchanged),
        Ok(_) => {
            info!(username = %admin.username, "Created administrator account");
            Ok(AdminOutcome::Created)
        }
        // The email was claimed between the check and the insert.
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Ok(conflict("email", &email))
        }
        Err(e) => Err(e.into()),
    }
}

fn conflict(field: &'static str, value: &str) -> AdminOutcome {
    error!(
        field,
        value,
        "Configured admin {field} is held by another account, administrator not created"
    );
    AdminOutcome::Conflict { field }
}

/// Ensure required database indexes exist.
///
/// Schema sync only creates unique indexes, so lookup indexes on foreign
/// keys and filter columns are created here on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let statements = [
        (
            "idx_project_author",
            Index::create()
                .if_not_exists()
                .name("idx_project_author")
                .table(project::Entity)
                .col(project::Column::AuthorId)
                .to_string(PostgresQueryBuilder),
        ),
        (
            "idx_project_created",
            Index::create()
                .if_not_exists()
                .name("idx_project_created")
                .table(project::Entity)
                .col(project::Column::CreatedAt)
                .to_string(PostgresQueryBuilder),
        ),
        (
            "idx_position_project",
            Index::create()
                .if_not_exists()
                .name("idx_position_project")
                .table(project_position::Entity)
                .col(project_position::Column::ProjectId)
                .to_string(PostgresQueryBuilder),
        ),
        // Project list filter: positions matching role and grade together.
        (
            "idx_position_role_grade",
            Index::create()
                .if_not_exists()
                .name("idx_position_role_grade")
                .table(project_position::Entity)
                .col(project_position::Column::RoleId)
                .col(project_position::Column::GradeId)
                .to_string(PostgresQueryBuilder),
        ),
        (
            "idx_experience_user",
            Index::create()
                .if_not_exists()
                .name("idx_experience_user")
                .table(experience::Entity)
                .col(experience::Column::UserId)
                .to_string(PostgresQueryBuilder),
        ),
    ];

    for (name, stmt) in statements {
        match db.execute_unprepared(&stmt).await {
            Ok(_) => info!("Ensured index {name} exists"),
            Err(e) => warn!("Failed to create index {name}: {e}"),
        }
    }

    Ok(())
}
