//! Shared state injected into every handler.

use crate::request::ApiRequest;
use crate::response::ApiResponse;
use crate::router::dispatch;
use crate::settings::AppSettings;
use rusqlite::Connection;
use staffing_core::db::{
    open_db, open_db_in_memory, open_db_with_report, DbResult, SchemaReport,
};

/// Owns the process database connection.
pub struct AppContext {
    conn: Connection,
}

impl AppContext {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens the database named by `settings` and applies migrations.
    pub fn open(settings: &AppSettings) -> DbResult<Self> {
        open_db(&settings.staffing_db_path).map(Self::new)
    }

    /// Like `open`, also reporting which schema steps ran.
    pub fn open_with_report(settings: &AppSettings) -> DbResult<(Self, SchemaReport)> {
        open_db_with_report(&settings.staffing_db_path)
            .map(|(conn, report)| (Self::new(conn), report))
    }

    pub fn in_memory() -> DbResult<Self> {
        open_db_in_memory().map(Self::new)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn handle(&self, request: &ApiRequest) -> ApiResponse {
        dispatch(&self.conn, request)
    }
}
