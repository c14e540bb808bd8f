use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::choice::{Grade, Role};
use crate::entity::{experience, user};
use crate::error::AppError;

use super::shared::{
    Pagination, double_option, validate_id_set, validate_length, validate_optional_url,
};
use super::skill::SkillResponse;

pub const MAX_SKILLS: usize = 100;
pub const MAX_EXPERIENCE: usize = 50;

/// One entry of a user's work history.
#[derive(Clone, Debug, Deserialize, PartialEq, utoipa::ToSchema)]
pub struct ExperienceInput {
    #[schema(example = "Acme Corp")]
    pub company: String,
    #[schema(example = "Backend Developer")]
    pub position: String,
    #[schema(example = "2021-03-01")]
    pub start_date: NaiveDate,
    /// Omit or null for a current job.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ExperienceResponse {
    pub id: Uuid,
    pub company: String,
    pub position: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
}

impl From<experience::Model> for ExperienceResponse {
    fn from(m: experience::Model) -> Self {
        Self {
            id: m.id,
            company: m.company,
            position: m.position,
            start_date: m.start_date,
            end_date: m.end_date,
            description: m.description,
        }
    }
}

/// What other users see of a profile. Role and grade are labels only.
#[derive(Clone, Serialize, utoipa::ToSchema)]
pub struct UserPublicResponse {
    pub id: Uuid,
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    pub telegram: Option<String>,
    pub avatar: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub resume: Option<String>,
    pub info: Option<String>,
    #[schema(example = "Backend Developer")]
    pub role: &'static str,
    #[schema(example = "Junior")]
    pub grade: &'static str,
}

impl From<user::Model> for UserPublicResponse {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            email: m.email,
            telegram: m.telegram,
            avatar: m.avatar,
            github: m.github,
            linkedin: m.linkedin,
            resume: m.resume,
            info: m.info,
            role: m.role_id.label(),
            grade: m.grade_id.label(),
        }
    }
}

/// Full profile, shown to the user themself and to administrators.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserSelfResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub telegram: Option<String>,
    pub avatar: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub resume: Option<String>,
    pub info: Option<String>,
    pub role_id: Role,
    #[schema(example = "Backend Developer")]
    pub role: &'static str,
    pub grade_id: Grade,
    #[schema(example = "Junior")]
    pub grade: &'static str,
    pub is_staff: bool,
    pub date_joined: DateTime<Utc>,
    pub skills: Vec<SkillResponse>,
    pub experience: Vec<ExperienceResponse>,
}

impl UserSelfResponse {
    pub fn new(
        m: user::Model,
        skills: Vec<SkillResponse>,
        experience: Vec<ExperienceResponse>,
    ) -> Self {
        Self {
            id: m.id,
            username: m.username,
            email: m.email,
            telegram: m.telegram,
            avatar: m.avatar,
            github: m.github,
            linkedin: m.linkedin,
            resume: m.resume,
            info: m.info,
            role_id: m.role_id,
            role: m.role_id.label(),
            grade_id: m.grade_id,
            grade: m.grade_id.label(),
            is_staff: m.is_staff,
            date_joined: m.date_joined,
            skills,
            experience,
        }
    }
}

/// `GET /users/{id}` answers with the full view for the owner or an admin.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum UserResponse {
    Full(UserSelfResponse),
    Public(UserPublicResponse),
}

/// Profile patch. `username`, `email` and `is_staff` are not client-settable and are ignored.
#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateUserRequest {
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, example = "alice_tg")]
    pub telegram: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub avatar: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, example = "https://github.com/alice")]
    pub github: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub linkedin: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub resume: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub info: Option<Option<String>>,
    pub role_id: Option<Role>,
    pub grade_id: Option<Grade>,
    /// Replaces the whole skill set when present.
    pub skills_ids: Option<Vec<Uuid>>,
    /// Replaces the whole work history when present.
    pub experience: Option<Vec<ExperienceInput>>,
}

impl UpdateUserRequest {
    /// Whether any column of the user row itself changes.
    pub fn touches_profile(&self) -> bool {
        self.telegram.is_some()
            || self.avatar.is_some()
            || self.github.is_some()
            || self.linkedin.is_some()
            || self.resume.is_some()
            || self.info.is_some()
            || self.role_id.is_some()
            || self.grade_id.is_some()
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SetSkillsRequest {
    pub skills_ids: Vec<Uuid>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SetExperienceRequest {
    pub experience: Vec<ExperienceInput>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct UserListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Case-insensitive substring match.
    pub username: Option<String>,
    /// Case-insensitive substring match.
    pub email: Option<String>,
    /// Case-insensitive substring match.
    pub telegram: Option<String>,
    /// Case-insensitive substring match.
    pub github: Option<String>,
    /// Case-insensitive substring match.
    pub linkedin: Option<String>,
    #[param(value_type = Option<Role>)]
    pub role_id: Option<Role>,
    #[param(value_type = Option<Grade>)]
    pub grade_id: Option<Grade>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserListResponse {
    pub data: Vec<UserPublicResponse>,
    pub pagination: Pagination,
}

fn validate_telegram(value: &Option<Option<String>>) -> Result<(), AppError> {
    if let Some(Some(tg)) = value {
        validate_length("telegram", tg, 1, 50)?;
        if tg.trim().chars().any(char::is_whitespace) {
            return Err(AppError::field(
                "telegram",
                "telegram must not contain spaces",
            ));
        }
    }
    Ok(())
}

pub fn validate_experience(entries: &[ExperienceInput]) -> Result<(), AppError> {
    if entries.len() > MAX_EXPERIENCE {
        return Err(AppError::field(
            "experience",
            format!("At most {MAX_EXPERIENCE} experience entries"),
        ));
    }
    for entry in entries {
        validate_length("company", &entry.company, 1, 255)?;
        validate_length("position", &entry.position, 1, 255)?;
        if let Some(ref d) = entry.description
            && d.chars().count() > 5000
        {
            return Err(AppError::field(
                "description",
                "description must be at most 5000 characters",
            ));
        }
        if let Some(end) = entry.end_date
            && end < entry.start_date
        {
            return Err(AppError::field(
                "end_date",
                "end_date must not be before start_date",
            ));
        }
    }
    Ok(())
}

pub fn validate_skills_ids(ids: &[Uuid]) -> Result<(), AppError> {
    validate_id_set(ids, "skills_ids", MAX_SKILLS)
}

pub fn validate_update_user(req: &UpdateUserRequest) -> Result<(), AppError> {
    validate_telegram(&req.telegram)?;
    validate_optional_url("avatar", &req.avatar)?;
    validate_optional_url("github", &req.github)?;
    validate_optional_url("linkedin", &req.linkedin)?;
    validate_optional_url("resume", &req.resume)?;
    if let Some(Some(ref info)) = req.info
        && info.chars().count() > 5000
    {
        return Err(AppError::field(
            "info",
            "info must be at most 5000 characters",
        ));
    }
    if let Some(ref ids) = req.skills_ids {
        validate_skills_ids(ids)?;
    }
    if let Some(ref entries) = req.experience {
        validate_experience(entries)?;
    }
    Ok(())
}
