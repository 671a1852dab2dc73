//! Transport-neutral request envelope.

use crate::error::ApiError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::str::FromStr;
use uuid::Uuid;

/// Header carrying the caller's team scope.
pub const TEAM_HEADER: &str = "x-team";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRequest {
    pub method: String,
    pub path: String,
    /// Filled by the router from matched path segments.
    #[serde(default)]
    pub path_params: BTreeMap<String, String>,
    #[serde(default)]
    pub query_params: BTreeMap<String, String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Raw JSON body.
    #[serde(default)]
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    pub(crate) fn with_path_param(mut self, name: &str, value: &str) -> Self {
        self.path_params.insert(name.to_string(), value.to_string());
        self
    }

    /// Header lookup, case-insensitive on the name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Trimmed team scope, `None` when absent or blank.
    pub fn team(&self) -> Option<&str> {
        self.header(TEAM_HEADER)
            .map(str::trim)
            .filter(|team| !team.is_empty())
    }

    /// Trimmed query value, `None` when absent or blank.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query_params
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub(crate) fn query_parsed<T: FromStr>(&self, name: &str) -> Result<Option<T>, ApiError> {
        self.query(name)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|_| ApiError::bad_request(format!("invalid `{name}` query value `{raw}`")))
            })
            .transpose()
    }

    pub(crate) fn query_uuid(&self, name: &str) -> Result<Option<Uuid>, ApiError> {
        self.query(name).map(|raw| parse_id(name, raw)).transpose()
    }

    /// Path parameter parsed as a UUID.
    pub(crate) fn path_id(&self, name: &str) -> Result<Uuid, ApiError> {
        let raw = self
            .path_params
            .get(name)
            .ok_or_else(|| ApiError::bad_request(format!("missing path parameter `{name}`")))?;
        parse_id(name, raw)
    }

    pub(crate) fn path_param(&self, name: &str) -> Result<&str, ApiError> {
        self.path_params
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ApiError::bad_request(format!("missing path parameter `{name}`")))
    }

    /// Deserializes the body; an absent or blank body reads as `{}`.
    pub(crate) fn json_body<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let raw = self
            .body
            .as_deref()
            .map(str::trim)
            .filter(|body| !body.is_empty())
            .unwrap_or("{}");
        serde_json::from_str(raw)
            .map_err(|err| ApiError::bad_request(format!("invalid JSON body: {err}")))
    }
}

fn parse_id(name: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::bad_request(format!("`{name}` must be a UUID, got `{raw}`")))
}
