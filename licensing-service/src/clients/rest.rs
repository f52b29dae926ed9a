//! Direct REST client with a statically configured base URL

use async_trait::async_trait;

use super::{fetch_organization, ClientError, OrganizationClient};
use crate::models::Organization;

pub struct OrganizationRestClient {
    http: reqwest::Client,
    base_url: String,
}

impl OrganizationRestClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl OrganizationClient for OrganizationRestClient {
    async fn get_organization(
        &self,
        organization_id: &str,
        auth_token: &str,
    ) -> Result<Option<Organization>, ClientError> {
        fetch_organization(&self.http, &self.base_url, organization_id, auth_token).await
    }
}
