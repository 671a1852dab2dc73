//! Unified error contract for every core operation.
//!
//! # Invariants
//! - Validation, not-found and business-rule failures are raised where they
//!   are detected and passed through untouched by callers.
//! - `Internal` wraps storage failures; its detail is for logs only.

use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Machine-readable code of a violated domain rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleCode {
    InactiveResource,
    DailyCapacityExceeded,
    DuplicateProjectCode,
    CapacityLimitExceeded,
}

impl RuleCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InactiveResource => "INACTIVE_RESOURCE",
            Self::DailyCapacityExceeded => "DAILY_CAPACITY_EXCEEDED",
            Self::DuplicateProjectCode => "DUPLICATE_PROJECT_CODE",
            Self::CapacityLimitExceeded => "CAPACITY_LIMIT_EXCEEDED",
        }
    }
}

impl Display for RuleCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub enum ServiceError {
    /// Malformed or missing input. `field` names the offending input when
    /// there is exactly one.
    Validation {
        field: Option<&'static str>,
        message: String,
    },
    /// Referenced entity is absent.
    NotFound { entity: &'static str, id: String },
    /// A domain rule rejected the operation.
    BusinessRule {
        code: RuleCode,
        message: String,
        details: Option<serde_json::Value>,
    },
    /// Unexpected storage failure.
    Internal(RepoError),
}

impl ServiceError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: Some(field),
            message: message.into(),
        }
    }

    pub fn missing(field: &'static str) -> Self {
        Self::validation(field, format!("{field} is required"))
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn rule(code: RuleCode, message: impl Into<String>) -> Self {
        Self::BusinessRule {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Rule code for business-rule failures, `None` otherwise.
    pub fn rule_code(&self) -> Option<RuleCode> {
        match self {
            Self::BusinessRule { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation { message, .. } => write!(f, "{message}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::BusinessRule { message, .. } => write!(f, "{message}"),
            Self::Internal(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Internal(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::InvalidResource(err) => Self::Validation {
                field: None,
                message: err.to_string(),
            },
            RepoError::InvalidProject(err) => Self::Validation {
                field: None,
                message: err.to_string(),
            },
            RepoError::InvalidAssignment(err) => Self::Validation {
                field: None,
                message: err.to_string(),
            },
            other => Self::Internal(other),
        }
    }
}
