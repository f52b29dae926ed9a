//! Declarative client bound to a logical service name
//!
//! The binding is fixed at construction; the address is resolved through
//! the registry transparently on first use and cached for the client's
//! lifetime. Same request and response shape as the other transports.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::registry::ServiceRegistry;
use super::{fetch_organization, ClientError, OrganizationClient};
use crate::models::Organization;

pub struct OrganizationDeclarativeClient {
    http: reqwest::Client,
    registry: Arc<dyn ServiceRegistry>,
    service_name: String,
    resolved: OnceCell<String>,
}

impl OrganizationDeclarativeClient {
    pub fn new(
        http: reqwest::Client,
        registry: Arc<dyn ServiceRegistry>,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            http,
            registry,
            service_name: service_name.into(),
            resolved: OnceCell::new(),
        }
    }
}

#[async_trait]
impl OrganizationClient for OrganizationDeclarativeClient {
    async fn get_organization(
        &self,
        organization_id: &str,
        auth_token: &str,
    ) -> Result<Option<Organization>, ClientError> {
        let base_url = self
            .resolved
            .get_or_try_init(|| self.registry.resolve(&self.service_name))
            .await?;
        fetch_organization(&self.http, base_url, organization_id, auth_token).await
    }
}
