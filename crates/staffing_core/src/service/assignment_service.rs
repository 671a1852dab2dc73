//! Assignment validation and persistence use-cases.
//!
//! # Responsibility
//! - Validate proposed assignments through ordered hard gates.
//! - Persist validated assignments and return them with owner projections.
//! - Report a resource's capacity snapshot for one day.
//!
//! # Invariants
//! - Validation is read-only; the first failing gate wins.
//! - Only date-based assignments with a resource are capacity-checked.
//!   Month/year assignments are not.
//! - Hours already booked on the same project do not count against a new
//!   assignment for that project.
//! - Check-then-insert runs without a transaction; concurrent creations for
//!   the same resource and day can both pass the capacity check.
//! - Updates do not re-run the daily capacity check.

use crate::model::assignment::{
    is_valid_month, is_valid_year, parse_assignment_date, Assignment, AssignmentId,
    AssignmentPatch, AssignmentRecord, AssignmentRequest, TimeReference, MAX_YEAR, MIN_YEAR,
};
use crate::model::non_blank;
use crate::model::project::Project;
use crate::model::resource::{Resource, ResourceId};
use crate::repo::assignment_repo::{
    AssignmentListQuery, AssignmentRepository, SqliteAssignmentRepository,
};
use crate::repo::config_repo::SqliteConfigRepository;
use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use crate::repo::resource_repo::{ResourceRepository, SqliteResourceRepository};
use crate::repo::RepoError;
use crate::service::capacity::{
    AbsenceSource, CapacityCalculator, DailyCapacity, NoRecordedAbsences,
};
use crate::service::config_service::ConfigService;
use crate::service::error::{RuleCode, ServiceError, ServiceResult};
use chrono::{Datelike, NaiveDate};
use log::info;
use rusqlite::Connection;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

/// Outcome of a passed validation, carrying what the writer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedAssignment {
    pub project: Project,
    pub resource: Option<Resource>,
    pub time: TimeReference,
    pub title: String,
    pub hours: f64,
}

/// One resource's budget and bookings on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacitySnapshot {
    pub resource_id: ResourceId,
    pub date: NaiveDate,
    pub monthly_capacity: f64,
    pub base_daily_capacity: f64,
    pub absence_hours: f64,
    pub daily_capacity: f64,
    pub assigned_hours: f64,
    pub available_hours: f64,
}

pub struct AssignmentService<'conn, A: AbsenceSource = NoRecordedAbsences> {
    projects: SqliteProjectRepository<'conn>,
    resources: SqliteResourceRepository<'conn>,
    assignments: SqliteAssignmentRepository<'conn>,
    config: ConfigService<SqliteConfigRepository<'conn>>,
    capacity: CapacityCalculator<A>,
}

impl<'conn> AssignmentService<'conn> {
    /// Creates a service over `conn` with no recorded absences.
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_absences(conn, NoRecordedAbsences)
    }
}

impl<'conn, A: AbsenceSource> AssignmentService<'conn, A> {
    pub fn with_absences(conn: &'conn Connection, absences: A) -> Self {
        Self {
            projects: SqliteProjectRepository::new(conn),
            resources: SqliteResourceRepository::new(conn),
            assignments: SqliteAssignmentRepository::new(conn),
            config: ConfigService::new(SqliteConfigRepository::new(conn)),
            capacity: CapacityCalculator::new(absences),
        }
    }

    /// Runs every validation gate for a proposed assignment.
    ///
    /// # Errors
    /// - `Validation` for missing/malformed fields or no usable time reference.
    /// - `NotFound` for an unknown project or resource.
    /// - `BusinessRule` `INACTIVE_RESOURCE` or `DAILY_CAPACITY_EXCEEDED`.
    pub fn validate(&self, request: &AssignmentRequest) -> ServiceResult<ValidatedAssignment> {
        let project_id = request
            .project_id
            .ok_or_else(|| ServiceError::missing("projectId"))?;
        let title =
            non_blank(request.title.as_deref()).ok_or_else(|| ServiceError::missing("title"))?;
        let hours = request.hours.ok_or_else(|| ServiceError::missing("hours"))?;
        validate_hours(hours)?;
        let time = resolve_time_reference(request)?;

        let project = self
            .projects
            .get_project(project_id)?
            .ok_or_else(|| ServiceError::not_found("project", project_id))?;

        let resource = match request.resource_id {
            Some(resource_id) => Some(self.require_active_resource(resource_id)?),
            None => None,
        };

        if let (Some(resource), TimeReference::Date(date)) = (resource.as_ref(), time) {
            self.ensure_daily_capacity(resource, project.id, date, hours)?;
        }

        Ok(ValidatedAssignment {
            project,
            resource,
            time,
            title,
            hours,
        })
    }

    /// Validates and persists a new assignment.
    ///
    /// Validation failures are returned unchanged and nothing is written.
    pub fn create(&self, request: &AssignmentRequest) -> ServiceResult<AssignmentRecord> {
        let validated = match self.validate(request) {
            Ok(validated) => validated,
            Err(err) => {
                info!(
                    "event=assignment_create module=service status=rejected reason={}",
                    rejection_label(&err)
                );
                return Err(err);
            }
        };

        let (month, year) = validated.time.month_year();
        let assignment = Assignment {
            id: Uuid::new_v4(),
            project_id: validated.project.id,
            resource_id: validated.resource.as_ref().map(|resource| resource.id),
            title: validated.title,
            description: non_blank(request.description.as_deref()),
            skill_name: non_blank(request.skill_name.as_deref()),
            date: validated.time.date(),
            month,
            year,
            hours: validated.hours,
            created_at: 0,
            updated_at: 0,
        };
        let id = self.assignments.create_assignment(&assignment)?;
        info!(
            "event=assignment_create module=service status=ok assignment_id={id} project_id={} date_based={}",
            assignment.project_id,
            assignment.is_date_based()
        );

        self.reload(id)
    }

    pub fn get(&self, id: AssignmentId) -> ServiceResult<AssignmentRecord> {
        self.assignments
            .get_assignment(id)?
            .ok_or_else(|| ServiceError::not_found("assignment", id))
    }

    pub fn list(&self, query: &AssignmentListQuery) -> ServiceResult<Vec<AssignmentRecord>> {
        if let Some(month) = query.month {
            if !is_valid_month(month) {
                return Err(month_error(month));
            }
        }
        Ok(self.assignments.list_assignments(query)?)
    }

    /// Applies a partial update.
    ///
    /// A newly set resource must exist and be active. Hours and resource
    /// changes are not re-checked against daily capacity.
    pub fn update(
        &self,
        id: AssignmentId,
        patch: &AssignmentPatch,
    ) -> ServiceResult<AssignmentRecord> {
        if patch.is_empty() {
            return Err(ServiceError::Validation {
                field: None,
                message: "no updatable fields supplied".to_string(),
            });
        }

        let mut assignment = self.get(id)?.assignment;

        if let Some(title) = patch.title.as_deref() {
            assignment.title =
                non_blank(Some(title)).ok_or_else(|| ServiceError::missing("title"))?;
        }
        if let Some(description) = patch.description.as_ref() {
            assignment.description = non_blank(description.as_deref());
        }
        if let Some(skill_name) = patch.skill_name.as_ref() {
            assignment.skill_name = non_blank(skill_name.as_deref());
        }
        if let Some(hours) = patch.hours {
            validate_hours(hours)?;
            assignment.hours = hours;
        }
        if let Some(month) = patch.month {
            if !is_valid_month(month) {
                return Err(month_error(month));
            }
            assignment.month = month;
        }
        if let Some(year) = patch.year {
            if !is_valid_year(year) {
                return Err(year_error(year));
            }
            assignment.year = year;
        }
        if let Some(date) = assignment.date {
            let period_patched = patch.month.is_some() || patch.year.is_some();
            if period_patched
                && TimeReference::Date(date).month_year() != (assignment.month, assignment.year)
            {
                return Err(ServiceError::validation(
                    "month",
                    "month and year of a date-based assignment must match its date",
                ));
            }
        }
        if let Some(resource_id) = patch.resource_id {
            assignment.resource_id = match resource_id {
                Some(resource_id) => Some(self.require_active_resource(resource_id)?.id),
                None => None,
            };
        }

        self.assignments.update_assignment(&assignment)?;
        info!("event=assignment_update module=service status=ok assignment_id={id}");
        self.reload(id)
    }

    pub fn delete(&self, id: AssignmentId) -> ServiceResult<()> {
        self.assignments.delete_assignment(id)?;
        info!("event=assignment_delete module=service status=ok assignment_id={id}");
        Ok(())
    }

    /// Budget, bookings and headroom of `resource_id` on `date`.
    pub fn capacity_snapshot(
        &self,
        resource_id: ResourceId,
        date: NaiveDate,
    ) -> ServiceResult<CapacitySnapshot> {
        let resource = self
            .resources
            .get_resource(resource_id)?
            .ok_or_else(|| ServiceError::not_found("resource", resource_id))?;
        let stored_capacity = self.monthly_capacity_of(&resource);
        let daily = self
            .capacity
            .daily_capacity(resource.id, stored_capacity, date)?;
        let monthly_capacity = self.capacity.monthly_capacity(
            resource.id,
            stored_capacity,
            date.month(),
            date.year(),
        )?;
        let assigned_hours = self.assignments.hours_on_date(resource.id, date, None)?;

        Ok(CapacitySnapshot {
            resource_id: resource.id,
            date,
            monthly_capacity,
            base_daily_capacity: daily.base,
            absence_hours: daily.absence_hours,
            daily_capacity: daily.capacity,
            assigned_hours,
            available_hours: daily.available(assigned_hours),
        })
    }

    fn require_active_resource(&self, resource_id: ResourceId) -> ServiceResult<Resource> {
        let resource = self
            .resources
            .get_resource(resource_id)?
            .ok_or_else(|| ServiceError::not_found("resource", resource_id))?;
        if !resource.active {
            return Err(ServiceError::rule(
                RuleCode::InactiveResource,
                format!("Resource {} is inactive and cannot be assigned", resource.name),
            ));
        }
        Ok(resource)
    }

    fn ensure_daily_capacity(
        &self,
        resource: &Resource,
        project_id: Uuid,
        date: NaiveDate,
        requested: f64,
    ) -> ServiceResult<()> {
        let existing = self
            .assignments
            .hours_on_date(resource.id, date, Some(project_id))?;
        let daily = self
            .capacity
            .daily_capacity(resource.id, self.monthly_capacity_of(resource), date)?;

        if daily.admits(existing, requested) {
            return Ok(());
        }

        Err(capacity_exceeded(&daily, date, existing, requested))
    }

    /// Stored monthly capacity, or the configured ceiling when unset.
    fn monthly_capacity_of(&self, resource: &Resource) -> f64 {
        resource
            .default_capacity
            .unwrap_or_else(|| self.config.max_resource_hours())
    }

    fn reload(&self, id: AssignmentId) -> ServiceResult<AssignmentRecord> {
        self.assignments.get_assignment(id)?.ok_or_else(|| {
            ServiceError::Internal(RepoError::InvalidData(format!(
                "assignment {id} missing in read-back"
            )))
        })
    }
}

fn capacity_exceeded(
    daily: &DailyCapacity,
    date: NaiveDate,
    existing: f64,
    requested: f64,
) -> ServiceError {
    let available = daily.available(existing);
    let iso_date = date.format("%Y-%m-%d").to_string();
    ServiceError::BusinessRule {
        code: RuleCode::DailyCapacityExceeded,
        message: format!(
            "Daily capacity exceeded for {iso_date}. Available: {available} hours, \
             Requested: {requested} hours, Already assigned: {existing} hours, \
             Absence: {} hours",
            daily.absence_hours
        ),
        details: Some(json!({
            "date": iso_date,
            "baseDailyCapacity": daily.base,
            "absenceHours": daily.absence_hours,
            "dailyCapacity": daily.capacity,
            "existingHours": existing,
            "requestedHours": requested,
            "availableHours": available,
        })),
    }
}

fn validate_hours(hours: f64) -> ServiceResult<()> {
    if hours.is_finite() && hours > 0.0 {
        return Ok(());
    }
    Err(ServiceError::validation(
        "hours",
        format!("hours must be greater than 0, got {hours}"),
    ))
}

fn resolve_time_reference(request: &AssignmentRequest) -> ServiceResult<TimeReference> {
    if let Some(raw) = non_blank(request.date.as_deref()) {
        return parse_assignment_date(&raw)
            .map(TimeReference::Date)
            .ok_or_else(|| {
                ServiceError::validation(
                    "date",
                    format!("date `{raw}` is not a valid ISO date (YYYY-MM-DD)"),
                )
            });
    }

    match (request.month, request.year) {
        (Some(month), Some(year)) => {
            if !is_valid_month(month) {
                return Err(month_error(month));
            }
            if !is_valid_year(year) {
                return Err(year_error(year));
            }
            Ok(TimeReference::Period { month, year })
        }
        _ => Err(ServiceError::validation(
            "date",
            "either date or both month and year are required",
        )),
    }
}

fn month_error(month: u32) -> ServiceError {
    ServiceError::validation(
        "month",
        format!("month must be between 1 and 12, got {month}"),
    )
}

fn year_error(year: i32) -> ServiceError {
    ServiceError::validation(
        "year",
        format!("year must be between {MIN_YEAR} and {MAX_YEAR}, got {year}"),
    )
}

fn rejection_label(err: &ServiceError) -> &'static str {
    match err {
        ServiceError::Validation { .. } => "validation",
        ServiceError::NotFound { .. } => "not_found",
        ServiceError::BusinessRule { code, .. } => code.as_str(),
        ServiceError::Internal(_) => "internal",
    }
}

#[cfg(test)]
mod tests {
    use super::resolve_time_reference;
    use crate::model::assignment::{AssignmentRequest, TimeReference};
    use crate::service::error::ServiceError;
    use chrono::NaiveDate;

    #[test]
    fn date_wins_over_month_and_year() {
        let request = AssignmentRequest {
            date: Some("2026-03-05".to_string()),
            month: Some(7),
            year: Some(2030),
            ..AssignmentRequest::default()
        };
        assert_eq!(
            resolve_time_reference(&request).unwrap(),
            TimeReference::Date(NaiveDate::from_ymd_opt(2026, 3, 5).unwrap())
        );
    }

    #[test]
    fn blank_date_falls_back_to_period() {
        let request = AssignmentRequest {
            date: Some("  ".to_string()),
            month: Some(7),
            year: Some(2026),
            ..AssignmentRequest::default()
        };
        assert_eq!(
            resolve_time_reference(&request).unwrap(),
            TimeReference::Period {
                month: 7,
                year: 2026
            }
        );
    }

    #[test]
    fn month_without_year_is_not_a_time_reference() {
        let request = AssignmentRequest {
            month: Some(7),
            ..AssignmentRequest::default()
        };
        let err = resolve_time_reference(&request).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation {
                field: Some("date"),
                ..
            }
        ));
    }

    #[test]
    fn unparseable_date_is_rejected() {
        let request = AssignmentRequest {
            date: Some("next tuesday".to_string()),
            ..AssignmentRequest::default()
        };
        let err = resolve_time_reference(&request).unwrap_err();
        assert!(err.to_string().contains("next tuesday"));
    }

    #[test]
    fn out_of_range_month_is_rejected() {
        let request = AssignmentRequest {
            month: Some(13),
            year: Some(2026),
            ..AssignmentRequest::default()
        };
        assert!(matches!(
            resolve_time_reference(&request).unwrap_err(),
            ServiceError::Validation {
                field: Some("month"),
                ..
            }
        ));
    }
}
