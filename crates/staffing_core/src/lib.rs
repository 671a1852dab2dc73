//! Core domain logic for staffing capacity management.
//! This crate is the single source of truth for staffing business rules.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::assignment::{
    Assignment, AssignmentId, AssignmentPatch, AssignmentRecord, AssignmentRequest,
    TimeReference,
};
pub use model::config::{ConfigEntry, ConfigType, ConfigValue, ConfigWrite, ResolvedConfig};
pub use model::project::{
    NewProject, Project, ProjectId, ProjectPatch, ProjectStatus, ProjectSummary,
};
pub use model::resource::{NewResource, Resource, ResourceId, ResourcePatch, ResourceSummary};
pub use repo::assignment_repo::{
    AssignmentListQuery, AssignmentRepository, SqliteAssignmentRepository,
};
pub use repo::config_repo::{ConfigRepository, SqliteConfigRepository};
pub use repo::project_repo::{ProjectListQuery, ProjectRepository, SqliteProjectRepository};
pub use repo::resource_repo::{ResourceListQuery, ResourceRepository, SqliteResourceRepository};
pub use repo::{RepoError, RepoResult};
pub use service::assignment_service::{AssignmentService, CapacitySnapshot, ValidatedAssignment};
pub use service::capacity::{
    base_daily_capacity, AbsenceSource, CapacityCalculator, DailyCapacity, NoRecordedAbsences,
};
pub use service::config_service::{
    ConfigService, DEFAULT_MAX_RESOURCE_HOURS, MAX_RESOURCE_HOURS_KEY,
};
pub use service::error::{RuleCode, ServiceError, ServiceResult};
pub use service::project_service::ProjectService;
pub use service::resource_service::ResourceService;

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
