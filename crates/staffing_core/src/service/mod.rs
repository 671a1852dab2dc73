//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Report every failure through one `ServiceError` contract.

pub mod assignment_service;
pub mod capacity;
pub mod config_service;
pub mod error;
pub mod project_service;
pub mod resource_service;
