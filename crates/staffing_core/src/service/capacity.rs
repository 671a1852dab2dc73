//! Capacity derivation for resources.
//!
//! # Responsibility
//! - Derive daily and monthly hour budgets from a monthly capacity figure.
//! - Subtract recorded absences through the `AbsenceSource` hook.
//!
//! # Invariants
//! - `base_daily_capacity = floor(monthly / WORKING_DAYS_PER_MONTH)`.
//! - `daily_capacity = base_daily_capacity - absence_hours` (not clamped).
//! - Derivation is deterministic for the same inputs.

use crate::model::resource::ResourceId;
use crate::repo::RepoResult;
use chrono::NaiveDate;
use serde::Serialize;

/// Assumed working days in every month.
pub const WORKING_DAYS_PER_MONTH: f64 = 20.0;

/// Source of planned unavailability per resource.
///
/// No absence store exists yet; `NoRecordedAbsences` is the shipped
/// implementation until one is integrated.
pub trait AbsenceSource {
    /// Hours `resource_id` is absent on `date`.
    fn absence_hours(&self, resource_id: ResourceId, date: NaiveDate) -> RepoResult<f64>;
    /// Hours `resource_id` is absent across one calendar month.
    fn absence_hours_in_month(
        &self,
        resource_id: ResourceId,
        month: u32,
        year: i32,
    ) -> RepoResult<f64>;
}

/// Absence source reporting zero hours for everyone.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRecordedAbsences;

impl AbsenceSource for NoRecordedAbsences {
    fn absence_hours(&self, _resource_id: ResourceId, _date: NaiveDate) -> RepoResult<f64> {
        Ok(0.0)
    }

    fn absence_hours_in_month(
        &self,
        _resource_id: ResourceId,
        _month: u32,
        _year: i32,
    ) -> RepoResult<f64> {
        Ok(0.0)
    }
}

/// Whole hours a resource may work on an ordinary day.
pub fn base_daily_capacity(monthly_capacity: f64) -> f64 {
    (monthly_capacity / WORKING_DAYS_PER_MONTH).floor()
}

/// Breakdown of one resource's budget for one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCapacity {
    pub base: f64,
    pub absence_hours: f64,
    pub capacity: f64,
}

impl DailyCapacity {
    pub fn derive(monthly_capacity: f64, absence_hours: f64) -> Self {
        let base = base_daily_capacity(monthly_capacity);
        Self {
            base,
            absence_hours,
            capacity: base - absence_hours,
        }
    }

    /// Hours still bookable after `assigned` hours, never negative.
    pub fn available(&self, assigned: f64) -> f64 {
        (self.capacity - assigned).max(0.0)
    }

    /// Whether adding `requested` hours on top of `assigned` stays in budget.
    /// Filling the budget exactly is allowed.
    pub fn admits(&self, assigned: f64, requested: f64) -> bool {
        assigned + requested <= self.capacity
    }
}

/// Capacity calculator bound to an absence source.
#[derive(Debug, Clone, Default)]
pub struct CapacityCalculator<A: AbsenceSource = NoRecordedAbsences> {
    absences: A,
}

impl<A: AbsenceSource> CapacityCalculator<A> {
    pub fn new(absences: A) -> Self {
        Self { absences }
    }

    pub fn daily_capacity(
        &self,
        resource_id: ResourceId,
        monthly_capacity: f64,
        date: NaiveDate,
    ) -> RepoResult<DailyCapacity> {
        let absence_hours = self.absences.absence_hours(resource_id, date)?;
        Ok(DailyCapacity::derive(monthly_capacity, absence_hours))
    }

    /// Monthly budget minus absences recorded in that month.
    pub fn monthly_capacity(
        &self,
        resource_id: ResourceId,
        monthly_capacity: f64,
        month: u32,
        year: i32,
    ) -> RepoResult<f64> {
        let absence_hours = self
            .absences
            .absence_hours_in_month(resource_id, month, year)?;
        Ok(monthly_capacity - absence_hours)
    }
}
