use super::{deleted, HandlerResult};
use crate::error::ApiError;
use crate::request::ApiRequest;
use crate::response::ApiResponse;
use rusqlite::Connection;
use staffing_core::model::assignment::parse_assignment_date;
use staffing_core::{
    AssignmentService, ConfigService, NewResource, ResourceListQuery, ResourcePatch,
    ResourceService, ServiceError, SqliteConfigRepository, SqliteResourceRepository,
};

fn service(
    conn: &Connection,
) -> ResourceService<SqliteResourceRepository<'_>, SqliteConfigRepository<'_>> {
    ResourceService::new(
        SqliteResourceRepository::new(conn),
        ConfigService::new(SqliteConfigRepository::new(conn)),
    )
}

/// `GET /resources`: scoped by the team header, optional `active` filter.
pub(crate) fn list(conn: &Connection, request: &ApiRequest) -> HandlerResult {
    let query = ResourceListQuery {
        team: request.team().map(str::to_string),
        active: request.query_parsed::<bool>("active")?,
    };
    Ok(ApiResponse::ok(service(conn).list(&query)?))
}

pub(crate) fn create(conn: &Connection, request: &ApiRequest) -> HandlerResult {
    let input: NewResource = request.json_body()?;
    Ok(ApiResponse::created(service(conn).create(&input, request.team())?))
}

pub(crate) fn get(conn: &Connection, request: &ApiRequest) -> HandlerResult {
    let id = request.path_id("id")?;
    Ok(ApiResponse::ok(service(conn).get(id)?))
}

pub(crate) fn update(conn: &Connection, request: &ApiRequest) -> HandlerResult {
    let id = request.path_id("id")?;
    let patch: ResourcePatch = request.json_body()?;
    Ok(ApiResponse::ok(service(conn).update(id, &patch)?))
}

pub(crate) fn delete(conn: &Connection, request: &ApiRequest) -> HandlerResult {
    let id = request.path_id("id")?;
    service(conn).delete(id)?;
    Ok(deleted(id))
}

/// `GET /resources/{id}/capacity?date=YYYY-MM-DD`
pub(crate) fn capacity(conn: &Connection, request: &ApiRequest) -> HandlerResult {
    let id = request.path_id("id")?;
    let raw = request
        .query("date")
        .ok_or_else(|| ServiceError::missing("date"))?;
    let date = parse_assignment_date(raw)
        .ok_or_else(|| ApiError::bad_request(format!("invalid `date` query value `{raw}`")))?;
    Ok(ApiResponse::ok(
        AssignmentService::new(conn).capacity_snapshot(id, date)?,
    ))
}
