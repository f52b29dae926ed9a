//! License store seam
//!
//! Persistence is an external collaborator; the service only depends on this
//! trait. The in-memory implementation backs the binary and the tests.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::Result;
use crate::models::License;

#[async_trait]
pub trait LicenseStore: Send + Sync {
    async fn find_by_keys(
        &self,
        organization_id: &str,
        license_id: &str,
    ) -> Result<Option<License>>;

    async fn find_all_by_organization(&self, organization_id: &str) -> Result<Vec<License>>;

    /// Full-overwrite save keyed by license id
    async fn save(&self, license: &License) -> Result<()>;

    /// Deletes by license id alone; the organization id on the API surface
    /// only feeds the confirmation message (observed upstream contract,
    /// preserved as-is).
    async fn delete_by_license_id(&self, license_id: &str) -> Result<bool>;
}

/// In-memory store keyed by license id
#[derive(Default)]
pub struct InMemoryLicenseStore {
    licenses: DashMap<String, License>,
}

impl InMemoryLicenseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.licenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.licenses.is_empty()
    }
}

#[async_trait]
impl LicenseStore for InMemoryLicenseStore {
    async fn find_by_keys(
        &self,
        organization_id: &str,
        license_id: &str,
    ) -> Result<Option<License>> {
        Ok(self
            .licenses
            .get(license_id)
            .filter(|entry| entry.organization_id == organization_id)
            .map(|entry| entry.clone()))
    }

    async fn find_all_by_organization(&self, organization_id: &str) -> Result<Vec<License>> {
        Ok(self
            .licenses
            .iter()
            .filter(|entry| entry.organization_id == organization_id)
            .map(|entry| entry.clone())
            .collect())
    }

    async fn save(&self, license: &License) -> Result<()> {
        self.licenses
            .insert(license.license_id.clone(), license.clone());
        Ok(())
    }

    async fn delete_by_license_id(&self, license_id: &str) -> Result<bool> {
        Ok(self.licenses.remove(license_id).is_some())
    }
}
