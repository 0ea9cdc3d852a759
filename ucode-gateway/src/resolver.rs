//! Service-resource resolution.
//!
//! Maps (project, environment, service type) to the backend resource serving
//! it. Lookups can be cached for a configured TTL; with TTL 0 every request
//! asks the company service.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use ucode_common::ResolverConfig;

use crate::response::{ApiError, ApiResult};
use crate::services::company::{GetResourceEnvironmentReq, GetSingleServiceResourceReq};
use crate::services::{CompanyService, ServiceResource, ServiceType};
use crate::validation::require_uuid;

type ResourceKey = (String, String, ServiceType);

#[derive(Clone)]
pub struct ResourceResolver {
    company: Arc<dyn CompanyService>,
    cache: Option<Cache<ResourceKey, ServiceResource>>,
}

impl ResourceResolver {
    pub fn new(company: Arc<dyn CompanyService>, config: &ResolverConfig) -> Self {
        let cache = (config.cache_ttl_secs > 0).then(|| {
            Cache::builder()
                .max_capacity(config.cache_capacity)
                .time_to_live(Duration::from_secs(config.cache_ttl_secs))
                .build()
        });
        Self { company, cache }
    }

    /// Resource serving `service_type` for a project environment.
    pub async fn resolve(
        &self,
        project_id: &str,
        environment_id: &str,
        service_type: ServiceType,
    ) -> ApiResult<ServiceResource> {
        require_uuid("project_id", project_id)?;
        require_uuid("environment_id", environment_id)?;

        let key = (
            project_id.to_string(),
            environment_id.to_string(),
            service_type,
        );
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&key).await {
                return Ok(hit);
            }
        }

        let resource = self
            .company
            .get_single_service_resource(GetSingleServiceResourceReq {
                project_id: key.0.clone(),
                environment_id: key.1.clone(),
                service_type,
            })
            .await
            .map_err(ApiError::from)?;

        tracing::debug!(
            project_id,
            environment_id,
            service_type = %service_type,
            resource_environment_id = %resource.resource_environment_id,
            node_type = ?resource.node_type,
            "Resolved service resource"
        );

        if let Some(cache) = &self.cache {
            cache.insert(key, resource.clone()).await;
        }
        Ok(resource)
    }

    /// Resource owning a resource-environment id.
    pub async fn resource_environment(
        &self,
        resource_environment_id: &str,
    ) -> ApiResult<ServiceResource> {
        require_uuid("project_id", resource_environment_id)?;
        self.company
            .get_resource_environment(GetResourceEnvironmentReq {
                id: resource_environment_id.to_string(),
            })
            .await
            .map_err(ApiError::from)
    }

    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }
}
