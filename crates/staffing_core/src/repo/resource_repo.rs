//! Resource repository contract and SQLite implementation.
//!
//! # Invariants
//! - Deleting a resource removes its assignments in the same transaction.
//! - Team filters match case-insensitively.

use crate::model::resource::{Resource, ResourceId};
use crate::repo::{bool_to_int, parse_flag, parse_uuid, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const RESOURCE_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    role,
    team,
    default_capacity,
    is_active,
    created_at,
    updated_at
FROM resources";

/// Filter options for listing resources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceListQuery {
    pub team: Option<String>,
    pub active: Option<bool>,
}

pub trait ResourceRepository {
    fn create_resource(&self, resource: &Resource) -> RepoResult<ResourceId>;
    fn get_resource(&self, id: ResourceId) -> RepoResult<Option<Resource>>;
    fn list_resources(&self, query: &ResourceListQuery) -> RepoResult<Vec<Resource>>;
    /// Writes every mutable column of `resource` in one fixed-shape statement.
    fn update_resource(&self, resource: &Resource) -> RepoResult<()>;
    fn delete_resource(&self, id: ResourceId) -> RepoResult<()>;
}

pub struct SqliteResourceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteResourceRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ResourceRepository for SqliteResourceRepository<'_> {
    fn create_resource(&self, resource: &Resource) -> RepoResult<ResourceId> {
        resource.validate()?;

        self.conn.execute(
            "INSERT INTO resources (
                id,
                name,
                email,
                role,
                team,
                default_capacity,
                is_active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                resource.id.to_string(),
                resource.name.as_str(),
                resource.email.as_deref(),
                resource.role.as_deref(),
                resource.team.as_deref(),
                resource.default_capacity,
                bool_to_int(resource.active),
            ],
        )?;

        Ok(resource.id)
    }

    fn get_resource(&self, id: ResourceId) -> RepoResult<Option<Resource>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RESOURCE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_resource_row(row)?));
        }
        Ok(None)
    }

    fn list_resources(&self, query: &ResourceListQuery) -> RepoResult<Vec<Resource>> {
        let mut sql = format!("{RESOURCE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(team) = query.team.as_ref() {
            sql.push_str(" AND team = ? COLLATE NOCASE");
            bind_values.push(Value::Text(team.clone()));
        }
        if let Some(active) = query.active {
            sql.push_str(" AND is_active = ?");
            bind_values.push(Value::Integer(bool_to_int(active)));
        }
        sql.push_str(" ORDER BY name COLLATE NOCASE ASC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut resources = Vec::new();
        while let Some(row) = rows.next()? {
            resources.push(parse_resource_row(row)?);
        }
        Ok(resources)
    }

    fn update_resource(&self, resource: &Resource) -> RepoResult<()> {
        resource.validate()?;

        let changed = self.conn.execute(
            "UPDATE resources
             SET
                name = ?2,
                email = ?3,
                role = ?4,
                team = ?5,
                default_capacity = ?6,
                is_active = ?7,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                resource.id.to_string(),
                resource.name.as_str(),
                resource.email.as_deref(),
                resource.role.as_deref(),
                resource.team.as_deref(),
                resource.default_capacity,
                bool_to_int(resource.active),
            ],
        )?;

        if changed == 0 {
            return Err(not_found(resource.id));
        }
        Ok(())
    }

    fn delete_resource(&self, id: ResourceId) -> RepoResult<()> {
        let id_text = id.to_string();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM assignments WHERE resource_id = ?1;",
            [id_text.as_str()],
        )?;
        let changed = tx.execute("DELETE FROM resources WHERE id = ?1;", [id_text.as_str()])?;
        if changed == 0 {
            return Err(not_found(id));
        }
        tx.commit()?;
        Ok(())
    }
}

fn not_found(id: ResourceId) -> RepoError {
    RepoError::NotFound {
        entity: "resource",
        id: id.to_string(),
    }
}

fn parse_resource_row(row: &Row<'_>) -> RepoResult<Resource> {
    let id_text: String = row.get("id")?;
    let resource = Resource {
        id: parse_uuid(&id_text, "resources.id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        role: row.get("role")?,
        team: row.get("team")?,
        default_capacity: row.get("default_capacity")?,
        active: parse_flag(row.get("is_active")?, "resources.is_active")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    resource.validate()?;
    Ok(resource)
}
