//! Data models for the licensing service
//!
//! Wire names are camelCase to match the organization service's JSON shape.
//! The organization/contact fields on [`License`] are derived at read time
//! from the organization lookup and are never persisted back.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct License {
    /// Assigned once at creation, never regenerated
    pub license_id: String,
    pub organization_id: String,
    pub description: String,
    pub product_name: String,
    pub license_type: String,
    /// Server-side informational comment, attached to every outgoing value
    pub comment: String,
    pub organization_name: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: String,
}

impl License {
    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = comment.to_string();
        self
    }
}

/// Read-only view of an organization record, fetched from the organization
/// service and never persisted here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Organization {
    pub name: String,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: String,
}
