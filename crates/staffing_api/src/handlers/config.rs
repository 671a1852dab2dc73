use super::HandlerResult;
use crate::request::ApiRequest;
use crate::response::ApiResponse;
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{json, Value};
use staffing_core::{ConfigService, ConfigType, ConfigWrite, ServiceError, SqliteConfigRepository};

/// `PUT /config/{key}` body. `type` defaults to the JSON kind of `value`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigBody {
    value: Option<Value>,
    #[serde(rename = "type", alias = "configType")]
    config_type: Option<ConfigType>,
    description: Option<String>,
}

impl ConfigBody {
    fn into_write(self) -> Result<ConfigWrite, ServiceError> {
        let value = match self.value {
            None | Some(Value::Null) => return Err(ServiceError::missing("value")),
            Some(value) => value,
        };
        let config_type = self.config_type.unwrap_or_else(|| inferred_type(&value));
        let value = match value {
            Value::String(text) => text,
            other => other.to_string(),
        };
        Ok(ConfigWrite {
            value,
            config_type,
            description: self.description,
        })
    }
}

fn inferred_type(value: &Value) -> ConfigType {
    match value {
        Value::Number(_) => ConfigType::Number,
        Value::Bool(_) => ConfigType::Boolean,
        Value::Array(_) | Value::Object(_) => ConfigType::Json,
        Value::String(_) | Value::Null => ConfigType::String,
    }
}

fn service(conn: &Connection) -> ConfigService<SqliteConfigRepository<'_>> {
    ConfigService::new(SqliteConfigRepository::new(conn))
}

/// `GET /config`: active global entries plus the caller team's entries.
pub(crate) fn list(conn: &Connection, request: &ApiRequest) -> HandlerResult {
    Ok(ApiResponse::ok(service(conn).list(request.team())?))
}

pub(crate) fn resolve(conn: &Connection, request: &ApiRequest) -> HandlerResult {
    let key = request.path_param("key")?;
    Ok(ApiResponse::ok(service(conn).resolve(key, request.team())?))
}

pub(crate) fn upsert(conn: &Connection, request: &ApiRequest) -> HandlerResult {
    let key = request.path_param("key")?;
    let body: ConfigBody = request.json_body()?;
    let write = body.into_write()?;
    Ok(ApiResponse::ok(
        service(conn).upsert(key, request.team(), &write)?,
    ))
}

pub(crate) fn deactivate(conn: &Connection, request: &ApiRequest) -> HandlerResult {
    let key = request.path_param("key")?;
    service(conn).deactivate(key, request.team())?;
    Ok(ApiResponse::ok(json!({ "configKey": key, "active": false })))
}
