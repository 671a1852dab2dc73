//! Opening and preparing connections.
//!
//! Every connection handed out has `foreign_keys=ON`, a busy timeout and the
//! latest schema.

use super::migrations::{apply_migrations, SchemaReport};
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (or creates) the staffing database at `path`.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_db_with_report(path).map(|(conn, _)| conn)
}

/// Like `open_db`, also reporting which schema steps ran.
pub fn open_db_with_report(path: impl AsRef<Path>) -> DbResult<(Connection, SchemaReport)> {
    let path = path.as_ref();
    prepare("file", || Connection::open(path))
}

/// Fresh private database, used by tests and dry runs.
pub fn open_db_in_memory() -> DbResult<Connection> {
    prepare("memory", Connection::open_in_memory).map(|(conn, _)| conn)
}

fn prepare(
    mode: &'static str,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<(Connection, SchemaReport)> {
    let started_at = Instant::now();
    let result: DbResult<(Connection, SchemaReport)> = connect()
        .map_err(DbError::from)
        .and_then(|mut conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            conn.busy_timeout(BUSY_TIMEOUT)?;
            let report = apply_migrations(&mut conn)?;
            Ok((conn, report))
        });

    let elapsed_ms = started_at.elapsed().as_millis();
    match &result {
        Ok((_, report)) => info!(
            "event=db_open module=db status=ok mode={mode} duration_ms={elapsed_ms} schema={} applied={}",
            report.current,
            report.applied()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={mode} duration_ms={elapsed_ms} error={err}"
        ),
    }
    result
}
