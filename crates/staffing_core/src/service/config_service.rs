//! Config resolution use-cases.
//!
//! # Responsibility
//! - Resolve a key to a typed value, preferring team-scoped entries.
//! - Provide the non-fatal numeric lookup used by capacity rules.
//!
//! # Invariants
//! - Team lookup order: exact team, then case-insensitive team. No implicit
//!   fallback from a team lookup to the global entry.
//! - Malformed stored values never fail resolution; they degrade to text.

use crate::model::config::{ConfigEntry, ConfigType, ConfigValue, ConfigWrite, ResolvedConfig};
use crate::repo::config_repo::ConfigRepository;
use crate::service::error::{ServiceError, ServiceResult};
use log::warn;

/// Key of the monthly hours ceiling for a single resource.
pub const MAX_RESOURCE_HOURS_KEY: &str = "max_resource_hours";
/// Used when `max_resource_hours` is unset or unusable.
pub const DEFAULT_MAX_RESOURCE_HOURS: f64 = 180.0;

pub struct ConfigService<R: ConfigRepository> {
    repo: R,
}

impl<R: ConfigRepository> ConfigService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Resolves `key`, optionally scoped to `team`.
    ///
    /// # Errors
    /// - `NotFound` when no active entry matches.
    /// - `Internal` on storage failure.
    pub fn resolve(&self, key: &str, team: Option<&str>) -> ServiceResult<ResolvedConfig> {
        let entry = match team {
            Some(team) => match self.repo.find_active(key, Some(team))? {
                Some(entry) => Some(entry),
                None => self.repo.find_active_team_ignore_case(key, team)?,
            },
            None => self.repo.find_active(key, None)?,
        };

        let entry = entry.ok_or_else(|| ServiceError::not_found("config entry", key))?;
        Ok(ResolvedConfig {
            value: interpret_value(&entry),
            config_type: entry.config_type,
        })
    }

    /// Resolves a global numeric setting, falling back to `default` on any
    /// failure (missing key, storage error, non-numeric value).
    pub fn number_or(&self, key: &str, default: f64) -> f64 {
        match self.resolve(key, None) {
            Ok(resolved) => match resolved.value.as_f64() {
                Some(value) if value.is_finite() => value,
                _ => {
                    warn!(
                        "event=config_fallback module=config status=ok key={key} reason=not_numeric default={default}"
                    );
                    default
                }
            },
            Err(ServiceError::NotFound { .. }) => default,
            Err(err) => {
                warn!(
                    "event=config_fallback module=config status=error key={key} default={default} error={err}"
                );
                default
            }
        }
    }

    /// Monthly hours ceiling for one resource.
    pub fn max_resource_hours(&self) -> f64 {
        self.number_or(MAX_RESOURCE_HOURS_KEY, DEFAULT_MAX_RESOURCE_HOURS)
    }

    pub fn list(&self, team: Option<&str>) -> ServiceResult<Vec<ConfigEntry>> {
        Ok(self.repo.list_active(team)?)
    }

    /// Stores `write` under `(key, team)` after checking the value matches its
    /// declared type.
    pub fn upsert(
        &self,
        key: &str,
        team: Option<&str>,
        write: &ConfigWrite,
    ) -> ServiceResult<ConfigEntry> {
        if key.trim().is_empty() {
            return Err(ServiceError::missing("configKey"));
        }
        validate_typed_value(write)?;
        Ok(self.repo.upsert(key.trim(), team, write)?)
    }

    pub fn deactivate(&self, key: &str, team: Option<&str>) -> ServiceResult<()> {
        Ok(self.repo.deactivate(key, team)?)
    }
}

/// Interprets a stored raw value by its declared type.
pub fn interpret_value(entry: &ConfigEntry) -> ConfigValue {
    let raw = entry.config_value.as_str();
    match entry.config_type {
        ConfigType::Json => match serde_json::from_str(raw) {
            Ok(value) => ConfigValue::Json(value),
            Err(err) => {
                warn!(
                    "event=config_parse_failed module=config status=error key={} type=json error={}",
                    entry.config_key, err
                );
                ConfigValue::Text(raw.to_string())
            }
        },
        ConfigType::Number => match raw.trim().parse::<f64>() {
            Ok(value) => ConfigValue::Number(value),
            Err(err) => {
                warn!(
                    "event=config_parse_failed module=config status=error key={} type=number error={}",
                    entry.config_key, err
                );
                ConfigValue::Text(raw.to_string())
            }
        },
        ConfigType::Boolean => ConfigValue::Boolean(raw == "true"),
        ConfigType::String => ConfigValue::Text(raw.to_string()),
    }
}

fn validate_typed_value(write: &ConfigWrite) -> ServiceResult<()> {
    match write.config_type {
        ConfigType::Json => serde_json::from_str::<serde_json::Value>(&write.value)
            .map(|_| ())
            .map_err(|err| ServiceError::validation("value", format!("value is not valid json: {err}"))),
        ConfigType::Number => match write.value.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(()),
            _ => Err(ServiceError::validation(
                "value",
                format!("value `{}` is not a number", write.value),
            )),
        },
        ConfigType::Boolean => match write.value.as_str() {
            "true" | "false" => Ok(()),
            other => Err(ServiceError::validation(
                "value",
                format!("value `{other}` is not a boolean (expected true|false)"),
            )),
        },
        ConfigType::String => Ok(()),
    }
}
