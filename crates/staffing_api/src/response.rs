//! Response envelope with fixed CORS headers.
//!
//! # Invariants
//! - Success bodies are `{"success":true,"data":...}`.
//! - Failure bodies are `{"success":false,"error":{"message","code","details"}}`.
//! - Every response carries the same CORS header set.

use crate::error::{ApiError, GENERIC_INTERNAL_MESSAGE, INTERNAL_ERROR};
use log::error;
use serde::Serialize;
use serde_json::{json, Value};

pub const CORS_HEADERS: [(&str, &str); 4] = [
    ("Access-Control-Allow-Origin", "*"),
    (
        "Access-Control-Allow-Methods",
        "GET, POST, PUT, PATCH, DELETE, OPTIONS",
    ),
    (
        "Access-Control-Allow-Headers",
        "Content-Type, Authorization, X-Team",
    ),
    ("Content-Type", "application/json"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status_code: u16,
    pub headers: Vec<(String, String)>,
    /// `None` for bodiless responses such as pre-flight.
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn ok(data: impl Serialize) -> Self {
        Self::success(200, data)
    }

    pub fn created(data: impl Serialize) -> Self {
        Self::success(201, data)
    }

    /// Bodiless pre-flight answer.
    pub fn preflight() -> Self {
        Self::with_body(204, None)
    }

    pub fn from_error(err: &ApiError) -> Self {
        let status_code = err.status_code();
        if status_code >= 500 {
            error!(
                "event=internal_error module=api status=error code={} error={err}",
                err.code()
            );
        }
        Self::failure(
            status_code,
            err.code(),
            &err.public_message(),
            err.details(),
        )
    }

    /// Serialized body text; empty for bodiless responses.
    pub fn body_string(&self) -> String {
        self.body.as_ref().map(Value::to_string).unwrap_or_default()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn success(status_code: u16, data: impl Serialize) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => Self::with_body(status_code, Some(json!({ "success": true, "data": data }))),
            Err(err) => {
                error!("event=response_encode module=api status=error error={err}");
                Self::failure(500, INTERNAL_ERROR, GENERIC_INTERNAL_MESSAGE, None)
            }
        }
    }

    fn failure(status_code: u16, code: &str, message: &str, details: Option<Value>) -> Self {
        Self::with_body(
            status_code,
            Some(json!({
                "success": false,
                "error": {
                    "message": message,
                    "code": code,
                    "details": details,
                }
            })),
        )
    }

    fn with_body(status_code: u16, body: Option<Value>) -> Self {
        Self {
            status_code,
            headers: CORS_HEADERS
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            body,
        }
    }
}
