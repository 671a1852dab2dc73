//! Resource (staff member) model.
//!
//! # Invariants
//! - `name` is never blank.
//! - `default_capacity`, when set, is a finite number of monthly hours >= 0.
//! - Inactive resources keep their history but may not receive new
//!   assignments.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ResourceId = Uuid;

/// Persisted staff member who can be assigned hours against projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    pub email: Option<String>,
    pub role: Option<String>,
    /// Team scope used for visibility filtering.
    pub team: Option<String>,
    /// Monthly hours. `None` means "use the configured maximum".
    pub default_capacity: Option<f64>,
    pub active: bool,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

impl Resource {
    /// Builds an active resource with a generated id and zeroed timestamps.
    ///
    /// Timestamps are assigned by storage on insert.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: None,
            role: None,
            team: None,
            default_capacity: None,
            active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn validate(&self) -> Result<(), ResourceValidationError> {
        if self.name.trim().is_empty() {
            return Err(ResourceValidationError::EmptyName);
        }
        if let Some(capacity) = self.default_capacity {
            validate_capacity(capacity)?;
        }
        Ok(())
    }
}

pub(crate) fn validate_capacity(capacity: f64) -> Result<(), ResourceValidationError> {
    if !capacity.is_finite() || capacity < 0.0 {
        return Err(ResourceValidationError::InvalidCapacity(capacity));
    }
    Ok(())
}

/// `{id, name}` projection of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSummary {
    pub id: ResourceId,
    pub name: String,
}

/// Create input for a resource.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResource {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub team: Option<String>,
    pub default_capacity: Option<f64>,
    pub active: Option<bool>,
}

/// Partial update for a resource. Absent fields are left unchanged;
/// `Some(None)` clears a nullable column.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::model::double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::model::double_option")]
    pub role: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::model::double_option")]
    pub team: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::model::double_option")]
    pub default_capacity: Option<Option<f64>>,
    pub active: Option<bool>,
}

impl ResourcePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.role.is_none()
            && self.team.is_none()
            && self.default_capacity.is_none()
            && self.active.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResourceValidationError {
    EmptyName,
    InvalidCapacity(f64),
}

impl Display for ResourceValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "resource name must not be blank"),
            Self::InvalidCapacity(value) => write!(
                f,
                "defaultCapacity must be a non-negative number of hours, got {value}"
            ),
        }
    }
}

impl Error for ResourceValidationError {}

#[cfg(test)]
mod tests {
    use super::{Resource, ResourceValidationError};

    #[test]
    fn rejects_blank_name() {
        let resource = Resource::new("   ");
        assert_eq!(resource.validate(), Err(ResourceValidationError::EmptyName));
    }

    #[test]
    fn rejects_negative_and_non_finite_capacity() {
        let mut resource = Resource::new("Ada");
        resource.default_capacity = Some(-1.0);
        assert!(matches!(
            resource.validate(),
            Err(ResourceValidationError::InvalidCapacity(_))
        ));

        resource.default_capacity = Some(f64::NAN);
        assert!(resource.validate().is_err());
    }

    #[test]
    fn zero_capacity_is_allowed() {
        let mut resource = Resource::new("Ada");
        resource.default_capacity = Some(0.0);
        assert!(resource.validate().is_ok());
    }
}
