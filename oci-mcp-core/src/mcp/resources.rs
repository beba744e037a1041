//! MCP Resource Providers
//!
//! Resources are read-only data sources exposed via MCP.

use super::protocol::{Resource, ResourceContents};
use crate::client::CloudClients;
use crate::error::Result;
use crate::ops;
use async_trait::async_trait;
use std::sync::Arc;

/// URI of the compartment listing resource
pub const COMPARTMENTS_URI: &str = "oci://compartments";

const JSON_MIME: &str = "application/json";

/// Trait for providing MCP resources
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// List available resources
    async fn list_resources(&self) -> Vec<Resource>;

    /// Read a resource by URI; `Ok(None)` when the URI is not ours
    async fn read_resource(&self, uri: &str) -> Result<Option<ResourceContents>>;
}

/// `oci://compartments`: the `list_compartments` rows under a
/// `compartments` key
pub struct CompartmentsResource {
    clients: Arc<dyn CloudClients>,
}

impl CompartmentsResource {
    pub fn new(clients: Arc<dyn CloudClients>) -> Self {
        Self { clients }
    }
}

#[async_trait]
impl ResourceProvider for CompartmentsResource {
    async fn list_resources(&self) -> Vec<Resource> {
        vec![Resource {
            uri: COMPARTMENTS_URI.to_string(),
            name: "compartments".to_string(),
            description: Some("Accessible compartments in the tenancy (id, name)".to_string()),
            mime_type: Some(JSON_MIME.to_string()),
        }]
    }

    async fn read_resource(&self, uri: &str) -> Result<Option<ResourceContents>> {
        if uri != COMPARTMENTS_URI {
            return Ok(None);
        }

        let compartments = ops::list_compartments(self.clients.as_ref()).await?;
        let body = serde_json::json!({ "compartments": compartments });

        Ok(Some(ResourceContents {
            uri: uri.to_string(),
            mime_type: Some(JSON_MIME.to_string()),
            text: serde_json::to_string_pretty(&body)?,
        }))
    }
}
