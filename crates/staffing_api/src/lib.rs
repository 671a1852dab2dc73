//! Request-handling boundary for the staffing core.
//!
//! # Responsibility
//! - Translate transport-neutral requests into core service calls.
//! - Map every core error to a status code exactly once.
//! - Own process settings and the injected database connection.
//!
//! # Invariants
//! - Handlers never panic; every outcome is an `ApiResponse`.
//! - Internal failures reach the caller only as a generic message.

mod context;
mod error;
mod handlers;
mod request;
mod response;
mod router;
mod settings;

pub use context::AppContext;
pub use error::ApiError;
pub use request::{ApiRequest, TEAM_HEADER};
pub use response::{ApiResponse, CORS_HEADERS};
pub use router::dispatch;
pub use settings::{AppSettings, SettingsError, DEFAULT_DB_FILE_NAME};
