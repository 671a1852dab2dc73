//! Key/value configuration entries.
//!
//! # Invariants
//! - Values are stored as text and interpreted by `config_type` on read.
//! - `team = None` marks a global entry; team-scoped entries shadow it.

use serde::{Deserialize, Serialize};

/// Declared interpretation of a stored config value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigType {
    Json,
    Number,
    Boolean,
    #[default]
    String,
}

impl ConfigType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::String => "string",
        }
    }

    /// Maps a stored type tag; unknown tags are treated as plain strings.
    pub fn from_db(value: &str) -> Self {
        match value {
            "json" => Self::Json,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            _ => Self::String,
        }
    }
}

/// Typed config value after interpretation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Json(serde_json::Value),
    Number(f64),
    Boolean(bool),
    Text(String),
}

impl ConfigValue {
    /// Numeric view of the value. Untyped text entries are parsed, so a
    /// setting stored without a `number` tag still resolves.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Json(value) => value.as_f64(),
            Self::Text(raw) => raw.trim().parse().ok(),
            Self::Boolean(_) => None,
        }
    }
}

/// Stored config row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigEntry {
    pub id: i64,
    pub config_key: String,
    pub team: Option<String>,
    pub config_value: String,
    pub config_type: ConfigType,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Result of resolving one key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConfig {
    pub value: ConfigValue,
    #[serde(rename = "type")]
    pub config_type: ConfigType,
}

/// Upsert input for one config entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigWrite {
    /// Raw text value as it will be stored.
    pub value: String,
    pub config_type: ConfigType,
    pub description: Option<String>,
}
