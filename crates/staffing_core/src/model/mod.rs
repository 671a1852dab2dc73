//! Staffing domain model.
//!
//! # Responsibility
//! - Define the records persisted for resources, projects, assignments and
//!   config entries, plus the typed create/patch inputs for each.
//! - Keep record-local invariants next to the record (`validate()`).
//!
//! # Invariants
//! - Every record is identified by a stable id that is never reused.
//! - Patch inputs carry only the fields a caller supplied.

use serde::{Deserialize, Deserializer};

pub mod assignment;
pub mod config;
pub mod project;
pub mod resource;

/// Deserializes a nullable field so that an absent key and an explicit `null`
/// stay distinguishable: absent -> `None`, `null` -> `Some(None)`.
///
/// Use together with `#[serde(default)]`.
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Trims a text input and maps blank values to `None`.
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}
