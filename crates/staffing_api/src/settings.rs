//! Process settings loaded from the environment.
//!
//! # Invariants
//! - A `.env` file is optional; real environment variables win over it.
//! - Every setting has a default, so an empty environment is valid.

use serde::Deserialize;
use staffing_core::LoggingError;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DEFAULT_DB_FILE_NAME: &str = "staffing.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppSettings {
    /// SQLite database file.
    #[serde(default = "default_db_path")]
    pub staffing_db_path: PathBuf,
    #[serde(default = "default_log_level")]
    pub staffing_log_level: String,
    /// Logging stays disabled when unset.
    #[serde(default)]
    pub staffing_log_dir: Option<PathBuf>,
}

#[derive(Debug)]
pub struct SettingsError(envy::Error);

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid settings: {}", self.0)
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl AppSettings {
    /// Loads `.env` when present, then reads `STAFFING_*` variables.
    pub fn load() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();
        envy::from_env::<AppSettings>().map_err(SettingsError)
    }

    /// Reads settings from explicit `(name, value)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, AppSettings>(pairs).map_err(SettingsError)
    }

    /// Starts file logging when a log directory is configured.
    ///
    /// Returns `Ok(false)` when logging is disabled.
    pub fn init_logging(&self) -> Result<bool, LoggingError> {
        let Some(log_dir) = self.staffing_log_dir.as_ref() else {
            return Ok(false);
        };
        staffing_core::init_logging(&self.staffing_log_level, log_dir)?;
        Ok(true)
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            staffing_db_path: default_db_path(),
            staffing_log_level: default_log_level(),
            staffing_log_dir: None,
        }
    }
}

fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}

fn default_log_level() -> String {
    staffing_core::default_log_level().to_string()
}
