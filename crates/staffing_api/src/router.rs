//! Path and method dispatch.
//!
//! # Invariants
//! - `OPTIONS` on any path answers pre-flight with 204.
//! - Unknown paths yield 404 `ROUTE_NOT_FOUND`; known paths with an
//!   unsupported method yield 405 `METHOD_NOT_ALLOWED`.

use crate::error::ApiError;
use crate::handlers::{assignments, config, projects, resources};
use crate::request::ApiRequest;
use crate::response::ApiResponse;
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route<'a> {
    Resources,
    Resource(&'a str),
    ResourceCapacity(&'a str),
    Projects,
    Project(&'a str),
    Assignments,
    Assignment(&'a str),
    ConfigEntries,
    ConfigEntry(&'a str),
}

fn match_route(path: &str) -> Option<Route<'_>> {
    let path = path.split('?').next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|segment| !segment.is_empty()).collect();

    match segments.as_slice() {
        ["resources"] => Some(Route::Resources),
        ["resources", id] => Some(Route::Resource(*id)),
        ["resources", id, "capacity"] => Some(Route::ResourceCapacity(*id)),
        ["projects"] => Some(Route::Projects),
        ["projects", id] => Some(Route::Project(*id)),
        ["assignments"] => Some(Route::Assignments),
        ["assignments", id] => Some(Route::Assignment(*id)),
        ["config"] => Some(Route::ConfigEntries),
        ["config", key] => Some(Route::ConfigEntry(*key)),
        _ => None,
    }
}

/// Handles one request against `conn`.
pub fn dispatch(conn: &Connection, request: &ApiRequest) -> ApiResponse {
    let method = request.method.trim().to_ascii_uppercase();
    let response = if method == "OPTIONS" {
        ApiResponse::preflight()
    } else {
        route(conn, &method, request).unwrap_or_else(|err| ApiResponse::from_error(&err))
    };

    info!(
        "event=request_handled module=api status={} method={method} path={}",
        response.status_code, request.path
    );
    response
}

fn route(conn: &Connection, method: &str, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
    let Some(route) = match_route(&request.path) else {
        return Err(ApiError::RouteNotFound {
            method: method.to_string(),
            path: request.path.clone(),
        });
    };

    match (route, method) {
        (Route::Resources, "GET") => resources::list(conn, request),
        (Route::Resources, "POST") => resources::create(conn, request),
        (Route::Resource(id), "GET") => resources::get(conn, &bind(request, "id", id)),
        (Route::Resource(id), "PATCH") => resources::update(conn, &bind(request, "id", id)),
        (Route::Resource(id), "DELETE") => resources::delete(conn, &bind(request, "id", id)),
        (Route::ResourceCapacity(id), "GET") => {
            resources::capacity(conn, &bind(request, "id", id))
        }
        (Route::Projects, "GET") => projects::list(conn, request),
        (Route::Projects, "POST") => projects::create(conn, request),
        (Route::Project(id), "GET") => projects::get(conn, &bind(request, "id", id)),
        (Route::Project(id), "PATCH") => projects::update(conn, &bind(request, "id", id)),
        (Route::Project(id), "DELETE") => projects::delete(conn, &bind(request, "id", id)),
        (Route::Assignments, "GET") => assignments::list(conn, request),
        (Route::Assignments, "POST") => assignments::create(conn, request),
        (Route::Assignment(id), "GET") => assignments::get(conn, &bind(request, "id", id)),
        (Route::Assignment(id), "PATCH") => assignments::update(conn, &bind(request, "id", id)),
        (Route::Assignment(id), "DELETE") => assignments::delete(conn, &bind(request, "id", id)),
        (Route::ConfigEntries, "GET") => config::list(conn, request),
        (Route::ConfigEntry(key), "GET") => config::resolve(conn, &bind(request, "key", key)),
        (Route::ConfigEntry(key), "PUT") => config::upsert(conn, &bind(request, "key", key)),
        (Route::ConfigEntry(key), "DELETE") => {
            config::deactivate(conn, &bind(request, "key", key))
        }
        _ => Err(ApiError::MethodNotAllowed {
            method: method.to_string(),
            path: request.path.clone(),
        }),
    }
}

fn bind(request: &ApiRequest, name: &str, value: &str) -> ApiRequest {
    request.clone().with_path_param(name, value)
}

#[cfg(test)]
mod tests {
    use super::{match_route, Route};

    #[test]
    fn matches_nested_and_trailing_slash_paths() {
        assert_eq!(match_route("/resources/"), Some(Route::Resources));
        assert_eq!(match_route("/resources/abc"), Some(Route::Resource("abc")));
        assert_eq!(
            match_route("/resources/abc/capacity?date=2026-03-05"),
            Some(Route::ResourceCapacity("abc"))
        );
        assert_eq!(
            match_route("config/max_resource_hours"),
            Some(Route::ConfigEntry("max_resource_hours"))
        );
    }

    #[test]
    fn unknown_paths_do_not_match() {
        assert_eq!(match_route("/"), None);
        assert_eq!(match_route("/absences"), None);
        assert_eq!(match_route("/projects/abc/members"), None);
    }
}
