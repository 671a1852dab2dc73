//! Boundary error type and its single status-code mapping.

use staffing_core::{RuleCode, ServiceError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
pub const ROUTE_NOT_FOUND: &str = "ROUTE_NOT_FOUND";
pub const METHOD_NOT_ALLOWED: &str = "METHOD_NOT_ALLOWED";

/// Message returned for internal failures.
pub const GENERIC_INTERNAL_MESSAGE: &str = "An unexpected error occurred";

#[derive(Debug)]
pub enum ApiError {
    Service(ServiceError),
    /// Request could not be decoded (body, path or query value).
    BadRequest(String),
    RouteNotFound { method: String, path: String },
    MethodNotAllowed { method: String, path: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Service(err) => service_status(err),
            Self::BadRequest(_) => 400,
            Self::RouteNotFound { .. } => 404,
            Self::MethodNotAllowed { .. } => 405,
        }
    }

    /// Machine-readable error code placed in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Service(ServiceError::Validation { .. }) | Self::BadRequest(_) => {
                VALIDATION_ERROR
            }
            Self::Service(ServiceError::NotFound { .. }) => NOT_FOUND,
            Self::Service(ServiceError::BusinessRule { code, .. }) => code.as_str(),
            Self::Service(ServiceError::Internal(_)) => INTERNAL_ERROR,
            Self::RouteNotFound { .. } => ROUTE_NOT_FOUND,
            Self::MethodNotAllowed { .. } => METHOD_NOT_ALLOWED,
        }
    }

    /// Caller-facing message. Internal details are withheld.
    pub fn public_message(&self) -> String {
        match self {
            Self::Service(ServiceError::Internal(_)) => GENERIC_INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Service(ServiceError::Validation {
                field: Some(field), ..
            }) => Some(serde_json::json!({ "field": field })),
            Self::Service(ServiceError::NotFound { entity, id }) => {
                Some(serde_json::json!({ "entity": entity, "id": id }))
            }
            Self::Service(ServiceError::BusinessRule { details, .. }) => details.clone(),
            _ => None,
        }
    }
}

fn service_status(err: &ServiceError) -> u16 {
    match err {
        ServiceError::Validation { .. } => 400,
        ServiceError::NotFound { .. } => 404,
        ServiceError::BusinessRule { code, .. } => match code {
            RuleCode::DailyCapacityExceeded | RuleCode::DuplicateProjectCode => 409,
            RuleCode::InactiveResource | RuleCode::CapacityLimitExceeded => 400,
        },
        ServiceError::Internal(_) => 500,
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Service(err) => write!(f, "{err}"),
            Self::BadRequest(message) => write!(f, "{message}"),
            Self::RouteNotFound { method, path } => write!(f, "no route for {method} {path}"),
            Self::MethodNotAllowed { method, path } => {
                write!(f, "method {method} is not allowed on {path}")
            }
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Service(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiError, GENERIC_INTERNAL_MESSAGE};
    use staffing_core::{RepoError, RuleCode, ServiceError};

    #[test]
    fn rule_codes_map_to_conflict_or_bad_request() {
        let cases = [
            (RuleCode::DailyCapacityExceeded, 409),
            (RuleCode::DuplicateProjectCode, 409),
            (RuleCode::InactiveResource, 400),
            (RuleCode::CapacityLimitExceeded, 400),
        ];
        for (code, status) in cases {
            let err = ApiError::from(ServiceError::rule(code, "rejected"));
            assert_eq!(err.status_code(), status, "{code}");
            assert_eq!(err.code(), code.as_str());
        }
    }

    #[test]
    fn internal_errors_hide_their_cause() {
        let err = ApiError::from(ServiceError::Internal(RepoError::InvalidData(
            "corrupt row in assignments".to_string(),
        )));
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert_eq!(err.public_message(), GENERIC_INTERNAL_MESSAGE);
        assert!(err.details().is_none());
    }

    #[test]
    fn validation_details_name_the_field() {
        let err = ApiError::from(ServiceError::missing("title"));
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(err.public_message(), "title is required");
        assert_eq!(err.details(), Some(serde_json::json!({ "field": "title" })));
    }
}
