//! Project use-case service.
//!
//! # Invariants
//! - Project codes are unique per team; a clash is a business-rule failure,
//!   not an internal error.
//! - Deleting a project deletes its assignments.

use crate::model::non_blank;
use crate::model::project::{is_valid_project_code, NewProject, Project, ProjectId, ProjectPatch};
use crate::repo::project_repo::{ProjectListQuery, ProjectRepository};
use crate::repo::RepoError;
use crate::service::error::{RuleCode, ServiceError, ServiceResult};
use log::info;
use uuid::Uuid;

pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a project. `team_scope` is used when the input names no team.
    pub fn create(&self, input: &NewProject, team_scope: Option<&str>) -> ServiceResult<Project> {
        let code = non_blank(input.code.as_deref()).ok_or_else(|| ServiceError::missing("code"))?;
        check_code(&code)?;
        let title =
            non_blank(input.title.as_deref()).ok_or_else(|| ServiceError::missing("title"))?;

        let project = Project {
            id: Uuid::new_v4(),
            code,
            title,
            project_type: non_blank(input.project_type.as_deref()),
            status: input.status.unwrap_or_default(),
            team: non_blank(input.team.as_deref()).or_else(|| non_blank(team_scope)),
            description: non_blank(input.description.as_deref()),
            created_at: 0,
            updated_at: 0,
        };
        let id = self.repo.create_project(&project).map_err(map_conflict)?;
        info!("event=project_create module=service status=ok project_id={id}");
        self.get(id)
    }

    pub fn get(&self, id: ProjectId) -> ServiceResult<Project> {
        self.repo
            .get_project(id)?
            .ok_or_else(|| ServiceError::not_found("project", id))
    }

    pub fn list(&self, query: &ProjectListQuery) -> ServiceResult<Vec<Project>> {
        Ok(self.repo.list_projects(query)?)
    }

    pub fn update(&self, id: ProjectId, patch: &ProjectPatch) -> ServiceResult<Project> {
        if patch.is_empty() {
            return Err(ServiceError::Validation {
                field: None,
                message: "no updatable fields supplied".to_string(),
            });
        }

        let mut project = self.get(id)?;
        if let Some(code) = patch.code.as_deref() {
            let code = non_blank(Some(code)).ok_or_else(|| ServiceError::missing("code"))?;
            check_code(&code)?;
            project.code = code;
        }
        if let Some(title) = patch.title.as_deref() {
            project.title = non_blank(Some(title)).ok_or_else(|| ServiceError::missing("title"))?;
        }
        if let Some(project_type) = patch.project_type.as_ref() {
            project.project_type = non_blank(project_type.as_deref());
        }
        if let Some(status) = patch.status {
            project.status = status;
        }
        if let Some(description) = patch.description.as_ref() {
            project.description = non_blank(description.as_deref());
        }

        self.repo.update_project(&project).map_err(map_conflict)?;
        info!("event=project_update module=service status=ok project_id={id}");
        self.get(id)
    }

    /// Deletes a project together with its assignments.
    pub fn delete(&self, id: ProjectId) -> ServiceResult<()> {
        self.repo.delete_project(id)?;
        info!("event=project_delete module=service status=ok project_id={id}");
        Ok(())
    }
}

fn check_code(code: &str) -> ServiceResult<()> {
    if is_valid_project_code(code) {
        return Ok(());
    }
    Err(ServiceError::validation(
        "code",
        format!("invalid project code `{code}`: expected 1-32 letters, digits, '.', '_' or '-'"),
    ))
}

fn map_conflict(err: RepoError) -> ServiceError {
    match err {
        RepoError::Conflict(message) => ServiceError::rule(RuleCode::DuplicateProjectCode, message),
        other => other.into(),
    }
}
