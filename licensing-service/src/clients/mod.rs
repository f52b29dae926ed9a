//! Organization service clients
//!
//! One capability (fetch an organization by id with a bearer token) with
//! three interchangeable transports that differ only in how the target
//! address is obtained:
//! - [`rest::OrganizationRestClient`]: statically configured base URL
//! - [`discovery::OrganizationDiscoveryClient`]: address resolved through
//!   the service registry on every call
//! - [`declarative::OrganizationDeclarativeClient`]: bound to the logical
//!   service name, resolving transparently on first use
//!
//! [`OrganizationLookup`] is the dispatch point; it holds all three and
//! picks one per call from a [`ClientKind`].

pub mod declarative;
pub mod discovery;
pub mod registry;
pub mod rest;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::models::Organization;

/// Which transport to use for one organization lookup.
///
/// Tags come in as free strings on the request path; anything unrecognized
/// deliberately falls back to the direct REST client rather than erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKind {
    Rest,
    Discovery,
    Declarative,
}

impl ClientKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "feign" => ClientKind::Declarative,
            "discovery" => ClientKind::Discovery,
            // "rest" and every unrecognized tag
            _ => ClientKind::Rest,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClientKind::Rest => "rest",
            ClientKind::Discovery => "discovery",
            ClientKind::Declarative => "feign",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request to organization service failed: {0}")]
    Request(String),

    #[error("Organization service returned status {0}")]
    Status(u16),

    #[error("Failed to decode organization response: {0}")]
    Decode(String),

    #[error("Service registry lookup failed: {0}")]
    Registry(String),
}

/// Fetch an organization by id, authenticating with the caller's token.
/// `Ok(None)` means the organization does not exist; transport failures are
/// `Err` and the caller decides how hard that failure is.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrganizationClient: Send + Sync {
    async fn get_organization(
        &self,
        organization_id: &str,
        auth_token: &str,
    ) -> Result<Option<Organization>, ClientError>;
}

/// Shared GET against `/v1/organization/{organizationId}`; all three
/// transports end up here once they know the base URL.
pub(crate) async fn fetch_organization(
    http: &reqwest::Client,
    base_url: &str,
    organization_id: &str,
    auth_token: &str,
) -> Result<Option<Organization>, ClientError> {
    let url = format!(
        "{}/v1/organization/{}",
        base_url.trim_end_matches('/'),
        organization_id
    );

    let response = http
        .get(&url)
        .header(reqwest::header::AUTHORIZATION, auth_token)
        .send()
        .await
        .map_err(|e| ClientError::Request(e.to_string()))?;

    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !response.status().is_success() {
        return Err(ClientError::Status(response.status().as_u16()));
    }

    response
        .json::<Organization>()
        .await
        .map(Some)
        .map_err(|e| ClientError::Decode(e.to_string()))
}

/// Dispatch point for the three transports. Pure selection: no business
/// logic beyond picking the client and tracing which one was used.
pub struct OrganizationLookup {
    rest: Arc<dyn OrganizationClient>,
    discovery: Arc<dyn OrganizationClient>,
    declarative: Arc<dyn OrganizationClient>,
}

impl OrganizationLookup {
    pub fn new(
        rest: Arc<dyn OrganizationClient>,
        discovery: Arc<dyn OrganizationClient>,
        declarative: Arc<dyn OrganizationClient>,
    ) -> Self {
        Self {
            rest,
            discovery,
            declarative,
        }
    }

    pub async fn fetch(
        &self,
        organization_id: &str,
        kind: ClientKind,
        auth_token: &str,
    ) -> Result<Option<Organization>, ClientError> {
        info!(
            client = kind.as_str(),
            organization_id, "Looking up organization"
        );

        let client = match kind {
            ClientKind::Rest => &self.rest,
            ClientKind::Discovery => &self.discovery,
            ClientKind::Declarative => &self.declarative,
        };

        client.get_organization(organization_id, auth_token).await
    }
}
