//! Service registry seam
//!
//! Discovery mechanics are an external collaborator; the clients only need
//! "logical name in, base URL out". The static implementation hands out
//! addresses from configuration.

use async_trait::async_trait;
use std::collections::HashMap;

use super::ClientError;

#[async_trait]
pub trait ServiceRegistry: Send + Sync {
    /// Resolve a logical service name to a base URL
    async fn resolve(&self, service_name: &str) -> Result<String, ClientError>;
}

/// Registry backed by a fixed name → URL map from configuration
#[derive(Debug, Default)]
pub struct StaticServiceRegistry {
    services: HashMap<String, String>,
}

impl StaticServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service(mut self, service_name: &str, base_url: &str) -> Self {
        self.services
            .insert(service_name.to_string(), base_url.to_string());
        self
    }
}

#[async_trait]
impl ServiceRegistry for StaticServiceRegistry {
    async fn resolve(&self, service_name: &str) -> Result<String, ClientError> {
        self.services.get(service_name).cloned().ok_or_else(|| {
            ClientError::Registry(format!("No instances registered for {service_name}"))
        })
    }
}
