//! Discovery-backed client
//!
//! Resolves the organization service's base URL through the registry on
//! every call, so address changes are picked up without restarting.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::registry::ServiceRegistry;
use super::{fetch_organization, ClientError, OrganizationClient};
use crate::models::Organization;

pub struct OrganizationDiscoveryClient {
    http: reqwest::Client,
    registry: Arc<dyn ServiceRegistry>,
    service_name: String,
}

impl OrganizationDiscoveryClient {
    pub fn new(
        http: reqwest::Client,
        registry: Arc<dyn ServiceRegistry>,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            http,
            registry,
            service_name: service_name.into(),
        }
    }
}

#[async_trait]
impl OrganizationClient for OrganizationDiscoveryClient {
    async fn get_organization(
        &self,
        organization_id: &str,
        auth_token: &str,
    ) -> Result<Option<Organization>, ClientError> {
        let base_url = self.registry.resolve(&self.service_name).await?;
        debug!(
            service = %self.service_name,
            base_url = %base_url,
            "Resolved organization service address"
        );
        fetch_organization(&self.http, &base_url, organization_id, auth_token).await
    }
}
