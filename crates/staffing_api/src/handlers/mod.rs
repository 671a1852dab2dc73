//! Per-entity request handlers.
//!
//! Each handler decodes its inputs, calls exactly one core service
//! operation and wraps the outcome. Status mapping lives in `ApiError`.

pub(crate) mod assignments;
pub(crate) mod config;
pub(crate) mod projects;
pub(crate) mod resources;

use crate::error::ApiError;
use crate::response::ApiResponse;
use serde_json::json;

pub(crate) type HandlerResult = Result<ApiResponse, ApiError>;

fn deleted(id: impl ToString) -> ApiResponse {
    ApiResponse::ok(json!({ "id": id.to_string(), "deleted": true }))
}
