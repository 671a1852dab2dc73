//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define per-entity data access contracts.
//! - Isolate SQL details from service orchestration.
//!
//! # Invariants
//! - Write paths call the record's `validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Every statement binds values as parameters; SQL text is fixed.

use crate::db::DbError;
use crate::model::assignment::AssignmentValidationError;
use crate::model::project::ProjectValidationError;
use crate::model::resource::ResourceValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod assignment_repo;
pub mod config_repo;
pub mod project_repo;
pub mod resource_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by all staffing stores.
#[derive(Debug)]
pub enum RepoError {
    InvalidResource(ResourceValidationError),
    InvalidProject(ProjectValidationError),
    InvalidAssignment(AssignmentValidationError),
    Db(DbError),
    NotFound { entity: &'static str, id: String },
    /// A unique index rejected the write.
    Conflict(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidResource(err) => write!(f, "{err}"),
            Self::InvalidProject(err) => write!(f, "{err}"),
            Self::InvalidAssignment(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Conflict(message) => write!(f, "conflict: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidResource(err) => Some(err),
            Self::InvalidProject(err) => Some(err),
            Self::InvalidAssignment(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } | Self::Conflict(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ResourceValidationError> for RepoError {
    fn from(value: ResourceValidationError) -> Self {
        Self::InvalidResource(value)
    }
}

impl From<ProjectValidationError> for RepoError {
    fn from(value: ProjectValidationError) -> Self {
        Self::InvalidProject(value)
    }
}

impl From<AssignmentValidationError> for RepoError {
    fn from(value: AssignmentValidationError) -> Self {
        Self::InvalidAssignment(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn parse_flag(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
