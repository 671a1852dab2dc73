//! Project model.
//!
//! # Invariants
//! - `code` matches `PROJECT_CODE_RE` and is unique per team (enforced by a
//!   unique index in storage).
//! - `title` is never blank.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ProjectId = Uuid;

static PROJECT_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]{0,31}$").expect("valid project code regex")
});

/// Delivery state of a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Planned,
    Active,
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Active => "active",
            Self::OnHold => "on_hold",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "planned" => Some(Self::Planned),
            "active" => Some(Self::Active),
            "on_hold" => Some(Self::OnHold),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub code: String,
    pub title: String,
    pub project_type: Option<String>,
    pub status: ProjectStatus,
    pub team: Option<String>,
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Project {
    pub fn new(code: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            title: title.into(),
            project_type: None,
            status: ProjectStatus::default(),
            team: None,
            description: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        if !is_valid_project_code(&self.code) {
            return Err(ProjectValidationError::InvalidCode(self.code.clone()));
        }
        if self.title.trim().is_empty() {
            return Err(ProjectValidationError::EmptyTitle);
        }
        Ok(())
    }
}

pub fn is_valid_project_code(value: &str) -> bool {
    PROJECT_CODE_RE.is_match(value)
}

/// `{id, code, title}` projection of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: ProjectId,
    pub code: String,
    pub title: String,
}

/// Create input for a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub code: Option<String>,
    pub title: Option<String>,
    pub project_type: Option<String>,
    pub status: Option<ProjectStatus>,
    pub team: Option<String>,
    pub description: Option<String>,
}

/// Partial update for a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    pub code: Option<String>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::model::double_option")]
    pub project_type: Option<Option<String>>,
    pub status: Option<ProjectStatus>,
    #[serde(default, deserialize_with = "crate::model::double_option")]
    pub description: Option<Option<String>>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.code.is_none()
            && self.title.is_none()
            && self.project_type.is_none()
            && self.status.is_none()
            && self.description.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectValidationError {
    InvalidCode(String),
    EmptyTitle,
}

impl Display for ProjectValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCode(code) => write!(
                f,
                "invalid project code `{code}`: expected 1-32 letters, digits, '.', '_' or '-'"
            ),
            Self::EmptyTitle => write!(f, "project title must not be blank"),
        }
    }
}

impl Error for ProjectValidationError {}
