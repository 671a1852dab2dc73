//! Assignment model.
//!
//! # Invariants
//! - An assignment belongs to exactly one project and at most one resource.
//! - `hours > 0`.
//! - `month`/`year` are always populated; for date-based assignments they are
//!   derived from `date`.

use crate::model::project::{ProjectId, ProjectSummary};
use crate::model::resource::{ResourceId, ResourceSummary};
use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type AssignmentId = Uuid;

/// Persisted commitment of hours against a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: AssignmentId,
    pub project_id: ProjectId,
    pub resource_id: Option<ResourceId>,
    pub title: String,
    pub description: Option<String>,
    pub skill_name: Option<String>,
    /// Set only for date-based assignments.
    pub date: Option<NaiveDate>,
    pub month: u32,
    pub year: i32,
    pub hours: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Assignment {
    pub fn is_date_based(&self) -> bool {
        self.date.is_some()
    }

    pub fn validate(&self) -> Result<(), AssignmentValidationError> {
        if self.title.trim().is_empty() {
            return Err(AssignmentValidationError::EmptyTitle);
        }
        if !(self.hours.is_finite() && self.hours > 0.0) {
            return Err(AssignmentValidationError::NonPositiveHours(self.hours));
        }
        if !is_valid_month(self.month) {
            return Err(AssignmentValidationError::InvalidMonth(self.month));
        }
        if !is_valid_year(self.year) {
            return Err(AssignmentValidationError::InvalidYear(self.year));
        }
        if let Some(date) = self.date {
            if (date.month(), date.year()) != (self.month, self.year) {
                return Err(AssignmentValidationError::PeriodMismatch);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentValidationError {
    EmptyTitle,
    NonPositiveHours(f64),
    InvalidMonth(u32),
    InvalidYear(i32),
    /// `month`/`year` disagree with `date`.
    PeriodMismatch,
}

impl Display for AssignmentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "assignment title must not be blank"),
            Self::NonPositiveHours(hours) => {
                write!(f, "hours must be greater than 0, got {hours}")
            }
            Self::InvalidMonth(month) => write!(f, "month must be between 1 and 12, got {month}"),
            Self::InvalidYear(year) => {
                write!(f, "year must be between {MIN_YEAR} and {MAX_YEAR}, got {year}")
            }
            Self::PeriodMismatch => {
                write!(f, "month and year must match the assignment date")
            }
        }
    }
}

impl Error for AssignmentValidationError {}

/// Assignment joined with the lightweight projections of its owners.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub project: ProjectSummary,
    pub resource: Option<ResourceSummary>,
}

/// Create input for an assignment, as received from callers.
///
/// Every field is optional here so presence can be reported as a validation
/// failure naming the missing field rather than a decode error.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequest {
    pub project_id: Option<ProjectId>,
    pub resource_id: Option<ResourceId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub skill_name: Option<String>,
    pub hours: Option<f64>,
    /// ISO date (`YYYY-MM-DD`) or RFC 3339 timestamp.
    pub date: Option<String>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// Partial update for an assignment.
///
/// Only these fields are mutable; `project_id` and `date` are fixed at
/// creation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPatch {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::model::double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::model::double_option")]
    pub skill_name: Option<Option<String>>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub hours: Option<f64>,
    #[serde(default, deserialize_with = "crate::model::double_option")]
    pub resource_id: Option<Option<ResourceId>>,
}

impl AssignmentPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.skill_name.is_none()
            && self.month.is_none()
            && self.year.is_none()
            && self.hours.is_none()
            && self.resource_id.is_none()
    }
}

/// Resolved time key of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeReference {
    /// Exact calendar day; subject to the daily capacity check.
    Date(NaiveDate),
    /// Whole month; not capacity-checked.
    Period { month: u32, year: i32 },
}

impl TimeReference {
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            Self::Date(date) => Some(date),
            Self::Period { .. } => None,
        }
    }

    /// Calendar month (1-12) and year of this reference.
    pub fn month_year(self) -> (u32, i32) {
        match self {
            Self::Date(date) => (date.month(), date.year()),
            Self::Period { month, year } => (month, year),
        }
    }
}

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 9999;

/// Parses an assignment date from `YYYY-MM-DD` or an RFC 3339 timestamp.
///
/// Timestamps keep the calendar date written in the string (no timezone
/// conversion).
pub fn parse_assignment_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|timestamp| timestamp.date_naive())
}

pub fn is_valid_month(month: u32) -> bool {
    (1..=12).contains(&month)
}

pub fn is_valid_year(year: i32) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&year)
}

#[cfg(test)]
mod tests {
    use super::{parse_assignment_date, AssignmentPatch, TimeReference};
    use chrono::NaiveDate;

    #[test]
    fn parses_plain_and_timestamp_dates() {
        let expected = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        assert_eq!(parse_assignment_date("2026-03-05"), Some(expected));
        assert_eq!(
            parse_assignment_date("2026-03-05T23:30:00+02:00"),
            Some(expected)
        );
        assert_eq!(parse_assignment_date("05/03/2026"), None);
        assert_eq!(parse_assignment_date("2026-02-30"), None);
    }

    #[test]
    fn date_reference_derives_month_and_year() {
        let date = NaiveDate::from_ymd_opt(2026, 12, 31).unwrap();
        assert_eq!(TimeReference::Date(date).month_year(), (12, 2026));
        assert_eq!(
            TimeReference::Period { month: 4, year: 2027 }.month_year(),
            (4, 2027)
        );
    }

    #[test]
    fn patch_distinguishes_null_from_absent() {
        let patch: AssignmentPatch =
            serde_json::from_str(r#"{"resourceId": null, "hours": 2}"#).unwrap();
        assert_eq!(patch.resource_id, Some(None));
        assert_eq!(patch.description, None);
        assert_eq!(patch.hours, Some(2.0));
        assert!(!patch.is_empty());

        let empty: AssignmentPatch = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }
}
