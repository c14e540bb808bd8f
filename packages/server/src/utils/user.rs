use sea_orm::sea_query::{LockType, Query as SeaQuery};
use sea_orm::*;
use uuid::Uuid;

use crate::entity::{
    experience, project, project_position, project_stack, skill, user, user_skill,
};
use crate::error::AppError;
use crate::models::shared::{normalize_optional, unique_ids};
use crate::models::skill::SkillResponse;
use crate::models::user::{ExperienceInput, ExperienceResponse, UserSelfResponse};

pub async fn find_user<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

pub async fn find_user_for_update(
    txn: &DatabaseTransaction,
    id: Uuid,
) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

pub async fn ensure_username_free<C: ConnectionTrait>(
    db: &C,
    username: &str,
) -> Result<(), AppError> {
    let taken = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .count(db)
        .await?;
    if taken > 0 {
        return Err(AppError::field(
            "username",
            "A user with this username already exists",
        ));
    }
    Ok(())
}

pub async fn ensure_email_free<C: ConnectionTrait>(db: &C, email: &str) -> Result<(), AppError> {
    let taken = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .count(db)
        .await?;
    if taken > 0 {
        return Err(AppError::field(
            "email",
            "A user with this email already exists",
        ));
    }
    Ok(())
}

/// Telegram handles are unique among users other than `owner`.
pub async fn ensure_telegram_free<C: ConnectionTrait>(
    db: &C,
    telegram: &str,
    owner: Uuid,
) -> Result<(), AppError> {
    let taken = user::Entity::find()
        .filter(user::Column::Telegram.eq(telegram))
        .filter(user::Column::Id.ne(owner))
        .count(db)
        .await?;
    if taken > 0 {
        return Err(AppError::field(
            "telegram",
            "A user with this telegram already exists",
        ));
    }
    Ok(())
}

pub async fn load_skills<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Vec<SkillResponse>, AppError> {
    let skills = skill::Entity::find()
        .filter(
            skill::Column::Id.in_subquery(
                SeaQuery::select()
                    .column(user_skill::Column::SkillId)
                    .from(user_skill::Entity)
                    .and_where(user_skill::Column::UserId.eq(user_id))
                    .to_owned(),
            ),
        )
        .order_by_asc(skill::Column::Name)
        .all(db)
        .await?;
    Ok(skills.into_iter().map(Into::into).collect())
}

/// Most recent job first.
pub async fn load_experience<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Vec<ExperienceResponse>, AppError> {
    let rows = experience::Entity::find()
        .filter(experience::Column::UserId.eq(user_id))
        .order_by_desc(experience::Column::StartDate)
        .order_by_asc(experience::Column::Id)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn self_view<C: ConnectionTrait>(
    db: &C,
    model: user::Model,
) -> Result<UserSelfResponse, AppError> {
    let skills = load_skills(db, model.id).await?;
    let experience = load_experience(db, model.id).await?;
    Ok(UserSelfResponse::new(model, skills, experience))
}

/// Replace the user's skill set. Unknown ids fail the whole call.
pub async fn set_skills(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    skills_ids: &[Uuid],
) -> Result<(), AppError> {
    let ids = unique_ids(skills_ids);

    if !ids.is_empty() {
        let found = skill::Entity::find()
            .filter(skill::Column::Id.is_in(ids.iter().copied()))
            .count(txn)
            .await?;
        if found != ids.len() as u64 {
            return Err(AppError::NotFound("Skill not found".into()));
        }
    }

    user_skill::Entity::delete_many()
        .filter(user_skill::Column::UserId.eq(user_id))
        .exec(txn)
        .await?;

    for skill_id in ids {
        user_skill::ActiveModel {
            user_id: Set(user_id),
            skill_id: Set(skill_id),
        }
        .insert(txn)
        .await?;
    }
    Ok(())
}

/// Replace the user's whole work history.
pub async fn set_experience(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    entries: &[ExperienceInput],
) -> Result<(), AppError> {
    experience::Entity::delete_many()
        .filter(experience::Column::UserId.eq(user_id))
        .exec(txn)
        .await?;

    for entry in entries {
        experience::ActiveModel {
            id: Set(Uuid::now_v7()),
            company: Set(entry.company.trim().to_string()),
            position: Set(entry.position.trim().to_string()),
            start_date: Set(entry.start_date),
            end_date: Set(entry.end_date),
            description: Set(normalize_optional(entry.description.clone())),
            user_id: Set(user_id),
        }
        .insert(txn)
        .await?;
    }
    Ok(())
}

/// Delete a user with everything they own: experience, skill links, authored
/// projects and their positions and stack links.
pub async fn delete_user_cascade(txn: &DatabaseTransaction, user_id: Uuid) -> Result<(), AppError> {
    let authored = SeaQuery::select()
        .column(project::Column::Id)
        .from(project::Entity)
        .and_where(project::Column::AuthorId.eq(user_id))
        .to_owned();

    project_stack::Entity::delete_many()
        .filter(project_stack::Column::ProjectId.in_subquery(authored.clone()))
        .exec(txn)
        .await?;
    project_position::Entity::delete_many()
        .filter(project_position::Column::ProjectId.in_subquery(authored))
        .exec(txn)
        .await?;
    project::Entity::delete_many()
        .filter(project::Column::AuthorId.eq(user_id))
        .exec(txn)
        .await?;

    experience::Entity::delete_many()
        .filter(experience::Column::UserId.eq(user_id))
        .exec(txn)
        .await?;
    user_skill::Entity::delete_many()
        .filter(user_skill::Column::UserId.eq(user_id))
        .exec(txn)
        .await?;
    user::Entity::delete_by_id(user_id).exec(txn).await?;
    Ok(())
}
