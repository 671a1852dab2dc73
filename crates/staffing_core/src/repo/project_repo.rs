//! Project repository contract and SQLite implementation.
//!
//! # Invariants
//! - `(code, team)` uniqueness is enforced by the store; violations surface
//!   as `RepoError::Conflict`.
//! - Deleting a project removes its assignments in the same transaction.

use crate::model::project::{Project, ProjectId, ProjectStatus};
use crate::repo::{is_unique_violation, parse_uuid, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    code,
    title,
    project_type,
    status,
    team,
    description,
    created_at,
    updated_at
FROM projects";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectListQuery {
    pub team: Option<String>,
    pub status: Option<ProjectStatus>,
}

pub trait ProjectRepository {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>>;
    fn update_project(&self, project: &Project) -> RepoResult<()>;
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;
}

pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId> {
        project.validate()?;

        self.conn
            .execute(
                "INSERT INTO projects (
                    id,
                    code,
                    title,
                    project_type,
                    status,
                    team,
                    description
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    project.id.to_string(),
                    project.code.as_str(),
                    project.title.as_str(),
                    project.project_type.as_deref(),
                    project.status.as_str(),
                    project.team.as_deref(),
                    project.description.as_deref(),
                ],
            )
            .map_err(|err| map_code_conflict(err, project))?;

        Ok(project.id)
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(row)?));
        }
        Ok(None)
    }

    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>> {
        let mut sql = format!("{PROJECT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(team) = query.team.as_ref() {
            sql.push_str(" AND team = ? COLLATE NOCASE");
            bind_values.push(Value::Text(team.clone()));
        }
        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        sql.push_str(" ORDER BY code COLLATE NOCASE ASC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn update_project(&self, project: &Project) -> RepoResult<()> {
        project.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE projects
                 SET
                    code = ?2,
                    title = ?3,
                    project_type = ?4,
                    status = ?5,
                    description = ?6,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1;",
                params![
                    project.id.to_string(),
                    project.code.as_str(),
                    project.title.as_str(),
                    project.project_type.as_deref(),
                    project.status.as_str(),
                    project.description.as_deref(),
                ],
            )
            .map_err(|err| map_code_conflict(err, project))?;

        if changed == 0 {
            return Err(not_found(project.id));
        }
        Ok(())
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let id_text = id.to_string();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM assignments WHERE project_id = ?1;",
            [id_text.as_str()],
        )?;
        let changed = tx.execute("DELETE FROM projects WHERE id = ?1;", [id_text.as_str()])?;
        if changed == 0 {
            return Err(not_found(id));
        }
        tx.commit()?;
        Ok(())
    }
}

fn not_found(id: ProjectId) -> RepoError {
    RepoError::NotFound {
        entity: "project",
        id: id.to_string(),
    }
}

fn map_code_conflict(err: rusqlite::Error, project: &Project) -> RepoError {
    if is_unique_violation(&err) {
        return RepoError::Conflict(format!(
            "project code `{}` already exists for team `{}`",
            project.code,
            project.team.as_deref().unwrap_or("-")
        ));
    }
    err.into()
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let id_text: String = row.get("id")?;
    let status_text: String = row.get("status")?;
    let status = ProjectStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid project status `{status_text}` in projects.status"
        ))
    })?;

    Ok(Project {
        id: parse_uuid(&id_text, "projects.id")?,
        code: row.get("code")?,
        title: row.get("title")?,
        project_type: row.get("project_type")?,
        status,
        team: row.get("team")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
