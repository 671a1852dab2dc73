//! Ordered schema migrations for the staffing tables.
//!
//! # Invariants
//! - Versions are dense and ascending from 1.
//! - A run applies every pending step in one transaction; `user_version`
//!   moves with each step inside it.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct Step {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const STEPS: &[Step] = &[
    Step {
        version: 1,
        name: "staffing_core_tables",
        sql: include_str!("0001_staffing.sql"),
    },
    Step {
        version: 2,
        name: "config_entries",
        sql: include_str!("0002_config_entries.sql"),
    },
];

/// Schema versions before and after a migration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaReport {
    pub previous: u32,
    pub current: u32,
}

impl SchemaReport {
    pub fn applied(&self) -> u32 {
        self.current - self.previous
    }
}

pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Current `user_version` of an open database.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

/// Brings `conn` up to `latest_version()`.
///
/// # Errors
/// - `SchemaTooNew` when the file is ahead of this build.
/// - `MigrationFailed` naming the first step that did not apply.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<SchemaReport> {
    let previous = schema_version(conn)?;
    let supported = latest_version();
    if previous > supported {
        return Err(DbError::SchemaTooNew {
            found: previous,
            supported,
        });
    }

    let pending: Vec<&Step> = STEPS.iter().filter(|step| step.version > previous).collect();
    if pending.is_empty() {
        return Ok(SchemaReport {
            previous,
            current: previous,
        });
    }

    let tx = conn.transaction()?;
    for step in &pending {
        let batch = format!("{}\nPRAGMA user_version = {};", step.sql, step.version);
        tx.execute_batch(&batch)
            .map_err(|source| DbError::MigrationFailed {
                version: step.version,
                name: step.name,
                source,
            })?;
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;

    Ok(SchemaReport {
        previous,
        current: supported,
    })
}
