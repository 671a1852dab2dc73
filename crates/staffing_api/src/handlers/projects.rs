use super::{deleted, HandlerResult};
use crate::error::ApiError;
use crate::request::ApiRequest;
use crate::response::ApiResponse;
use rusqlite::Connection;
use staffing_core::{
    NewProject, ProjectListQuery, ProjectPatch, ProjectService, ProjectStatus,
    SqliteProjectRepository,
};

fn service(conn: &Connection) -> ProjectService<SqliteProjectRepository<'_>> {
    ProjectService::new(SqliteProjectRepository::new(conn))
}

pub(crate) fn list(conn: &Connection, request: &ApiRequest) -> HandlerResult {
    let status = request
        .query("status")
        .map(|raw| {
            ProjectStatus::parse(raw)
                .ok_or_else(|| ApiError::bad_request(format!("unknown project status `{raw}`")))
        })
        .transpose()?;
    let query = ProjectListQuery {
        team: request.team().map(str::to_string),
        status,
    };
    Ok(ApiResponse::ok(service(conn).list(&query)?))
}

pub(crate) fn create(conn: &Connection, request: &ApiRequest) -> HandlerResult {
    let input: NewProject = request.json_body()?;
    Ok(ApiResponse::created(service(conn).create(&input, request.team())?))
}

pub(crate) fn get(conn: &Connection, request: &ApiRequest) -> HandlerResult {
    let id = request.path_id("id")?;
    Ok(ApiResponse::ok(service(conn).get(id)?))
}

pub(crate) fn update(conn: &Connection, request: &ApiRequest) -> HandlerResult {
    let id = request.path_id("id")?;
    let patch: ProjectPatch = request.json_body()?;
    Ok(ApiResponse::ok(service(conn).update(id, &patch)?))
}

pub(crate) fn delete(conn: &Connection, request: &ApiRequest) -> HandlerResult {
    let id = request.path_id("id")?;
    service(conn).delete(id)?;
    Ok(deleted(id))
}
