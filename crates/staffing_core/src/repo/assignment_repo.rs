//! Assignment repository contract and SQLite implementation.
//!
//! # Invariants
//! - Read models always join the owning project; the resource join is
//!   optional because unassigned work is allowed.
//! - Dates are stored as ISO `YYYY-MM-DD` text.

use crate::model::assignment::{Assignment, AssignmentId, AssignmentRecord};
use crate::model::project::{ProjectId, ProjectSummary};
use crate::model::resource::{ResourceId, ResourceSummary};
use crate::repo::{parse_uuid, RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const DATE_FORMAT: &str = "%Y-%m-%d";

const ASSIGNMENT_RECORD_SELECT_SQL: &str = "SELECT
    a.id AS id,
    a.project_id AS project_id,
    a.resource_id AS resource_id,
    a.title AS title,
    a.description AS description,
    a.skill_name AS skill_name,
    a.assignment_date AS assignment_date,
    a.month AS month,
    a.year AS year,
    a.hours AS hours,
    a.created_at AS created_at,
    a.updated_at AS updated_at,
    p.code AS project_code,
    p.title AS project_title,
    r.name AS resource_name
FROM assignments a
INNER JOIN projects p ON p.id = a.project_id
LEFT JOIN resources r ON r.id = a.resource_id";

/// Filter options for listing assignments. All filters combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentListQuery {
    pub project_id: Option<ProjectId>,
    pub resource_id: Option<ResourceId>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub date: Option<NaiveDate>,
}

pub trait AssignmentRepository {
    fn create_assignment(&self, assignment: &Assignment) -> RepoResult<AssignmentId>;
    fn get_assignment(&self, id: AssignmentId) -> RepoResult<Option<AssignmentRecord>>;
    fn list_assignments(&self, query: &AssignmentListQuery) -> RepoResult<Vec<AssignmentRecord>>;
    fn update_assignment(&self, assignment: &Assignment) -> RepoResult<()>;
    fn delete_assignment(&self, id: AssignmentId) -> RepoResult<()>;
    /// Sums hours booked for `resource_id` on `date`, ignoring assignments of
    /// `excluded_project` when given.
    fn hours_on_date(
        &self,
        resource_id: ResourceId,
        date: NaiveDate,
        excluded_project: Option<ProjectId>,
    ) -> RepoResult<f64>;
}

pub struct SqliteAssignmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAssignmentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AssignmentRepository for SqliteAssignmentRepository<'_> {
    fn create_assignment(&self, assignment: &Assignment) -> RepoResult<AssignmentId> {
        assignment.validate()?;

        self.conn.execute(
            "INSERT INTO assignments (
                id,
                project_id,
                resource_id,
                title,
                description,
                skill_name,
                assignment_date,
                month,
                year,
                hours
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                assignment.id.to_string(),
                assignment.project_id.to_string(),
                assignment.resource_id.map(|id| id.to_string()),
                assignment.title.as_str(),
                assignment.description.as_deref(),
                assignment.skill_name.as_deref(),
                assignment.date.map(format_date),
                assignment.month,
                assignment.year,
                assignment.hours,
            ],
        )?;

        Ok(assignment.id)
    }

    fn get_assignment(&self, id: AssignmentId) -> RepoResult<Option<AssignmentRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ASSIGNMENT_RECORD_SELECT_SQL} WHERE a.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_record_row(row)?));
        }
        Ok(None)
    }

    fn list_assignments(&self, query: &AssignmentListQuery) -> RepoResult<Vec<AssignmentRecord>> {
        let mut sql = format!("{ASSIGNMENT_RECORD_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(project_id) = query.project_id {
            sql.push_str(" AND a.project_id = ?");
            bind_values.push(Value::Text(project_id.to_string()));
        }
        if let Some(resource_id) = query.resource_id {
            sql.push_str(" AND a.resource_id = ?");
            bind_values.push(Value::Text(resource_id.to_string()));
        }
        if let Some(month) = query.month {
            sql.push_str(" AND a.month = ?");
            bind_values.push(Value::Integer(i64::from(month)));
        }
        if let Some(year) = query.year {
            sql.push_str(" AND a.year = ?");
            bind_values.push(Value::Integer(i64::from(year)));
        }
        if let Some(date) = query.date {
            sql.push_str(" AND a.assignment_date = ?");
            bind_values.push(Value::Text(format_date(date)));
        }
        sql.push_str(" ORDER BY a.year ASC, a.month ASC, a.assignment_date ASC, a.created_at ASC, a.id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }
        Ok(records)
    }

    fn update_assignment(&self, assignment: &Assignment) -> RepoResult<()> {
        assignment.validate()?;

        let changed = self.conn.execute(
            "UPDATE assignments
             SET
                resource_id = ?2,
                title = ?3,
                description = ?4,
                skill_name = ?5,
                month = ?6,
                year = ?7,
                hours = ?8,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                assignment.id.to_string(),
                assignment.resource_id.map(|id| id.to_string()),
                assignment.title.as_str(),
                assignment.description.as_deref(),
                assignment.skill_name.as_deref(),
                assignment.month,
                assignment.year,
                assignment.hours,
            ],
        )?;

        if changed == 0 {
            return Err(not_found(assignment.id));
        }
        Ok(())
    }

    fn delete_assignment(&self, id: AssignmentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM assignments WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    fn hours_on_date(
        &self,
        resource_id: ResourceId,
        date: NaiveDate,
        excluded_project: Option<ProjectId>,
    ) -> RepoResult<f64> {
        let hours: f64 = self.conn.query_row(
            "SELECT COALESCE(SUM(hours), 0.0)
             FROM assignments
             WHERE resource_id = ?1
               AND assignment_date = ?2
               AND (?3 IS NULL OR project_id <> ?3);",
            params![
                resource_id.to_string(),
                format_date(date),
                excluded_project.map(|id| id.to_string()),
            ],
            |row| row.get(0),
        )?;
        Ok(hours)
    }
}

fn not_found(id: AssignmentId) -> RepoError {
    RepoError::NotFound {
        entity: "assignment",
        id: id.to_string(),
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<AssignmentRecord> {
    let id_text: String = row.get("id")?;
    let project_text: String = row.get("project_id")?;
    let project_id = parse_uuid(&project_text, "assignments.project_id")?;
    let resource_id = match row.get::<_, Option<String>>("resource_id")? {
        Some(value) => Some(parse_uuid(&value, "assignments.resource_id")?),
        None => None,
    };
    let date = match row.get::<_, Option<String>>("assignment_date")? {
        Some(value) => Some(NaiveDate::parse_from_str(&value, DATE_FORMAT).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid date `{value}` in assignments.assignment_date"
            ))
        })?),
        None => None,
    };

    let assignment = Assignment {
        id: parse_uuid(&id_text, "assignments.id")?,
        project_id,
        resource_id,
        title: row.get("title")?,
        description: row.get("description")?,
        skill_name: row.get("skill_name")?,
        date,
        month: row.get("month")?,
        year: row.get("year")?,
        hours: row.get("hours")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    assignment.validate()?;

    let project = ProjectSummary {
        id: project_id,
        code: row.get("project_code")?,
        title: row.get("project_title")?,
    };
    let resource = match (resource_id, row.get::<_, Option<String>>("resource_name")?) {
        (Some(id), Some(name)) => Some(ResourceSummary { id, name }),
        _ => None,
    };

    Ok(AssignmentRecord {
        assignment,
        project,
        resource,
    })
}
