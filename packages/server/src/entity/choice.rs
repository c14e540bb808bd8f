//! Role and grade choices shared by users and project positions.
//!
//! The string keys are the storage and wire contract; labels only appear in read shapes.

use std::fmt;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Developer specialisation.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    #[sea_orm(string_value = "not_selected")]
    NotSelected,
    #[sea_orm(string_value = "backend")]
    Backend,
    #[sea_orm(string_value = "frontend")]
    Frontend,
    #[sea_orm(string_value = "devops")]
    Devops,
    #[sea_orm(string_value = "designer")]
    Designer,
    #[sea_orm(string_value = "qa")]
    Qa,
    #[sea_orm(string_value = "pm")]
    Pm,
}

impl Role {
    pub fn key(self) -> &'static str {
        match self {
            Role::NotSelected => "not_selected",
            Role::Backend => "backend",
            Role::Frontend => "frontend",
            Role::Devops => "devops",
            Role::Designer => "designer",
            Role::Qa => "qa",
            Role::Pm => "pm",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Role::NotSelected => "Not selected",
            Role::Backend => "Backend Developer",
            Role::Frontend => "Frontend Developer",
            Role::Devops => "DevOps Engineer",
            Role::Designer => "UI/UX Designer",
            Role::Qa => "QA",
            Role::Pm => "PM",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Seniority level.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    #[default]
    #[sea_orm(string_value = "not_selected")]
    NotSelected,
    #[sea_orm(string_value = "intern")]
    Intern,
    #[sea_orm(string_value = "junior")]
    Junior,
    #[sea_orm(string_value = "middle")]
    Middle,
    #[sea_orm(string_value = "senior")]
    Senior,
    #[sea_orm(string_value = "lead")]
    Lead,
    #[sea_orm(string_value = "architect")]
    Architect,
}

impl Grade {
    pub fn key(self) -> &'static str {
        match self {
            Grade::NotSelected => "not_selected",
            Grade::Intern => "intern",
            Grade::Junior => "junior",
            Grade::Middle => "middle",
            Grade::Senior => "senior",
            Grade::Lead => "lead",
            Grade::Architect => "architect",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Grade::NotSelected => "Not selected",
            Grade::Intern => "Intern",
            Grade::Junior => "Junior",
            Grade::Middle => "Middle",
            Grade::Senior => "Senior",
            Grade::Lead => "Tech Lead",
            Grade::Architect => "Architect",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
