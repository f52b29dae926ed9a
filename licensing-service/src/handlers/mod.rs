//! HTTP handlers for the licensing endpoints
//!
//! Handlers are thin: extract path and body, pass the request context on
//! explicitly, delegate to [`LicenseService`], and shape the response.

pub mod licenses;

use std::sync::Arc;

use crate::clients::ClientKind;
use crate::services::LicenseService;

pub use licenses::{
    create_license, delete_license, get_license, get_license_with_client, get_licenses, health,
    update_license,
};

/// Shared application state handed to every handler
pub struct AppState {
    pub service: Arc<LicenseService>,
    /// Transport used when the request path does not name one
    pub default_client: ClientKind,
}
