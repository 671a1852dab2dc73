use super::{deleted, HandlerResult};
use crate::error::ApiError;
use crate::request::ApiRequest;
use crate::response::ApiResponse;
use rusqlite::Connection;
use staffing_core::model::assignment::parse_assignment_date;
use staffing_core::{AssignmentListQuery, AssignmentPatch, AssignmentRequest, AssignmentService};

/// `GET /assignments`: every query filter combines with AND.
pub(crate) fn list(conn: &Connection, request: &ApiRequest) -> HandlerResult {
    let date = request
        .query("date")
        .map(|raw| {
            parse_assignment_date(raw)
                .ok_or_else(|| ApiError::bad_request(format!("invalid `date` query value `{raw}`")))
        })
        .transpose()?;
    let query = AssignmentListQuery {
        project_id: request.query_uuid("projectId")?,
        resource_id: request.query_uuid("resourceId")?,
        month: request.query_parsed::<u32>("month")?,
        year: request.query_parsed::<i32>("year")?,
        date,
    };
    Ok(ApiResponse::ok(AssignmentService::new(conn).list(&query)?))
}

pub(crate) fn create(conn: &Connection, request: &ApiRequest) -> HandlerResult {
    let input: AssignmentRequest = request.json_body()?;
    Ok(ApiResponse::created(AssignmentService::new(conn).create(&input)?))
}

pub(crate) fn get(conn: &Connection, request: &ApiRequest) -> HandlerResult {
    let id = request.path_id("id")?;
    Ok(ApiResponse::ok(AssignmentService::new(conn).get(id)?))
}

/// Partial update. Daily capacity is not re-checked.
pub(crate) fn update(conn: &Connection, request: &ApiRequest) -> HandlerResult {
    let id = request.path_id("id")?;
    let patch: AssignmentPatch = request.json_body()?;
    Ok(ApiResponse::ok(AssignmentService::new(conn).update(id, &patch)?))
}

pub(crate) fn delete(conn: &Connection, request: &ApiRequest) -> HandlerResult {
    let id = request.path_id("id")?;
    AssignmentService::new(conn).delete(id)?;
    Ok(deleted(id))
}
