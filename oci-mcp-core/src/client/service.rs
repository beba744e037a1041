//! Service names, aliases and endpoints

use crate::error::{OciMcpError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// OCI services the tools talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// Identity and access management
    Identity,
    /// Compute instances
    Compute,
    /// Virtual cloud network
    Network,
    /// Database service
    Database,
    /// Object storage
    ObjectStorage,
    /// Usage (cost) API
    Usage,
}

impl ServiceKind {
    /// All services
    pub const ALL: [ServiceKind; 6] = [
        ServiceKind::Identity,
        ServiceKind::Compute,
        ServiceKind::Network,
        ServiceKind::Database,
        ServiceKind::ObjectStorage,
        ServiceKind::Usage,
    ];

    /// Resolve a case-insensitive alias
    pub fn from_alias(name: &str) -> Result<Self> {
        let lowered = name.to_lowercase();
        match lowered.as_str() {
            "identity" | "iam" => Ok(ServiceKind::Identity),
            "compute" | "core" => Ok(ServiceKind::Compute),
            "network" | "virtualnetwork" | "vcn" => Ok(ServiceKind::Network),
            "database" | "db" => Ok(ServiceKind::Database),
            "object_storage" | "objectstorage" | "os" => Ok(ServiceKind::ObjectStorage),
            "usage" | "usage_api" | "cost" => Ok(ServiceKind::Usage),
            _ => Err(OciMcpError::invalid_argument(format!(
                "Unknown OCI service: {}",
                lowered
            ))),
        }
    }

    /// Canonical name
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Identity => "identity",
            ServiceKind::Compute => "compute",
            ServiceKind::Network => "network",
            ServiceKind::Database => "database",
            ServiceKind::ObjectStorage => "object_storage",
            ServiceKind::Usage => "usage",
        }
    }

    /// Regional endpoint host, without the API version prefix
    pub fn endpoint(&self, region: &str) -> String {
        match self {
            ServiceKind::Identity => format!("https://identity.{}.oci.oraclecloud.com", region),
            ServiceKind::Compute | ServiceKind::Network => {
                format!("https://iaas.{}.oraclecloud.com", region)
            }
            ServiceKind::Database => format!("https://database.{}.oraclecloud.com", region),
            ServiceKind::ObjectStorage => {
                format!("https://objectstorage.{}.oraclecloud.com", region)
            }
            ServiceKind::Usage => format!("https://usageapi.{}.oci.oraclecloud.com", region),
        }
    }

    /// API version path prefix
    pub fn api_prefix(&self) -> &'static str {
        match self {
            ServiceKind::Identity
            | ServiceKind::Compute
            | ServiceKind::Network
            | ServiceKind::Database => "/20160918",
            ServiceKind::ObjectStorage => "",
            ServiceKind::Usage => "/20200107",
        }
    }

    /// Endpoint plus prefix, honoring a host override
    pub fn base_url(&self, region: &str, endpoint_override: Option<&str>) -> String {
        let host = match endpoint_override {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => self.endpoint(region),
        };
        format!("{}{}", host, self.api_prefix())
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = OciMcpError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_alias(s)
    }
}
