//! Resource use-case service.
//!
//! # Invariants
//! - A supplied `default_capacity` is >= 0 and does not exceed the configured
//!   `max_resource_hours` ceiling.
//! - Partial updates change only supplied fields.

use crate::model::non_blank;
use crate::model::resource::{
    validate_capacity, NewResource, Resource, ResourceId, ResourcePatch,
};
use crate::repo::config_repo::ConfigRepository;
use crate::repo::resource_repo::{ResourceListQuery, ResourceRepository};
use crate::service::config_service::ConfigService;
use crate::service::error::{RuleCode, ServiceError, ServiceResult};
use log::info;
use serde_json::json;
use uuid::Uuid;

pub struct ResourceService<R: ResourceRepository, C: ConfigRepository> {
    repo: R,
    config: ConfigService<C>,
}

impl<R: ResourceRepository, C: ConfigRepository> ResourceService<R, C> {
    pub fn new(repo: R, config: ConfigService<C>) -> Self {
        Self { repo, config }
    }

    /// Creates a resource. `team_scope` is used when the input names no team.
    pub fn create(
        &self,
        input: &NewResource,
        team_scope: Option<&str>,
    ) -> ServiceResult<Resource> {
        let name = non_blank(input.name.as_deref()).ok_or_else(|| ServiceError::missing("name"))?;
        if let Some(capacity) = input.default_capacity {
            self.check_capacity(capacity)?;
        }

        let resource = Resource {
            id: Uuid::new_v4(),
            name,
            email: non_blank(input.email.as_deref()),
            role: non_blank(input.role.as_deref()),
            team: non_blank(input.team.as_deref()).or_else(|| non_blank(team_scope)),
            default_capacity: input.default_capacity,
            active: input.active.unwrap_or(true),
            created_at: 0,
            updated_at: 0,
        };
        let id = self.repo.create_resource(&resource)?;
        info!("event=resource_create module=service status=ok resource_id={id}");
        self.get(id)
    }

    pub fn get(&self, id: ResourceId) -> ServiceResult<Resource> {
        self.repo
            .get_resource(id)?
            .ok_or_else(|| ServiceError::not_found("resource", id))
    }

    pub fn list(&self, query: &ResourceListQuery) -> ServiceResult<Vec<Resource>> {
        Ok(self.repo.list_resources(query)?)
    }

    pub fn update(&self, id: ResourceId, patch: &ResourcePatch) -> ServiceResult<Resource> {
        if patch.is_empty() {
            return Err(ServiceError::Validation {
                field: None,
                message: "no updatable fields supplied".to_string(),
            });
        }

        let mut resource = self.get(id)?;
        if let Some(name) = patch.name.as_deref() {
            resource.name = non_blank(Some(name)).ok_or_else(|| ServiceError::missing("name"))?;
        }
        if let Some(email) = patch.email.as_ref() {
            resource.email = non_blank(email.as_deref());
        }
        if let Some(role) = patch.role.as_ref() {
            resource.role = non_blank(role.as_deref());
        }
        if let Some(team) = patch.team.as_ref() {
            resource.team = non_blank(team.as_deref());
        }
        if let Some(capacity) = patch.default_capacity {
            if let Some(capacity) = capacity {
                self.check_capacity(capacity)?;
            }
            resource.default_capacity = capacity;
        }
        if let Some(active) = patch.active {
            resource.active = active;
        }

        self.repo.update_resource(&resource)?;
        info!("event=resource_update module=service status=ok resource_id={id}");
        self.get(id)
    }

    /// Deletes a resource together with its assignments.
    pub fn delete(&self, id: ResourceId) -> ServiceResult<()> {
        self.repo.delete_resource(id)?;
        info!("event=resource_delete module=service status=ok resource_id={id}");
        Ok(())
    }

    fn check_capacity(&self, capacity: f64) -> ServiceResult<()> {
        validate_capacity(capacity)
            .map_err(|err| ServiceError::validation("defaultCapacity", err.to_string()))?;

        let ceiling = self.config.max_resource_hours();
        if capacity > ceiling {
            return Err(ServiceError::BusinessRule {
                code: RuleCode::CapacityLimitExceeded,
                message: format!(
                    "defaultCapacity {capacity} exceeds the maximum of {ceiling} hours per month"
                ),
                details: Some(json!({
                    "defaultCapacity": capacity,
                    "maxResourceHours": ceiling,
                })),
            });
        }
        Ok(())
    }
}
