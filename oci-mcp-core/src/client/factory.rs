//! Client factory
//!
//! Turns the resolved credentials into per-call service clients. Clients are
//! cheap handles over one shared `reqwest::Client` and one signer.

use super::compute::{ComputeApi, ComputeClient};
use super::database::{DatabaseApi, DatabaseClient};
use super::identity::{IdentityApi, IdentityClient};
use super::network::{NetworkApi, VirtualNetworkClient};
use super::object_storage::{ObjectStorageApi, ObjectStorageClient};
use super::service::ServiceKind;
use super::transport::OciHttpClient;
#[cfg(feature = "usage-api")]
use super::usage::UsageClient;
use super::usage::UsageApi;
use crate::auth::{ApiKeySigner, OciConfig, RequestSigner, ResolvedCredentials};
use crate::error::Result;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A bound client for one service
#[derive(Debug, Clone)]
pub enum ServiceClient {
    Identity(IdentityClient),
    Compute(ComputeClient),
    Network(VirtualNetworkClient),
    Database(DatabaseClient),
    ObjectStorage(ObjectStorageClient),
    #[cfg(feature = "usage-api")]
    Usage(UsageClient),
}

impl ServiceClient {
    /// Service this client talks to
    pub fn kind(&self) -> ServiceKind {
        match self {
            ServiceClient::Identity(_) => ServiceKind::Identity,
            ServiceClient::Compute(_) => ServiceKind::Compute,
            ServiceClient::Network(_) => ServiceKind::Network,
            ServiceClient::Database(_) => ServiceKind::Database,
            ServiceClient::ObjectStorage(_) => ServiceKind::ObjectStorage,
            #[cfg(feature = "usage-api")]
            ServiceClient::Usage(_) => ServiceKind::Usage,
        }
    }

    /// Base URL the client targets
    pub fn base_url(&self) -> &str {
        match self {
            ServiceClient::Identity(c) => c.base_url(),
            ServiceClient::Compute(c) => c.base_url(),
            ServiceClient::Network(c) => c.base_url(),
            ServiceClient::Database(c) => c.base_url(),
            ServiceClient::ObjectStorage(c) => c.base_url(),
            #[cfg(feature = "usage-api")]
            ServiceClient::Usage(c) => c.base_url(),
        }
    }
}

/// Source of service clients and scope defaults for the tool operations
pub trait CloudClients: Send + Sync {
    fn compute(&self) -> Result<Arc<dyn ComputeApi>>;
    fn network(&self) -> Result<Arc<dyn NetworkApi>>;
    fn identity(&self) -> Result<Arc<dyn IdentityApi>>;
    fn database(&self) -> Result<Arc<dyn DatabaseApi>>;
    fn object_storage(&self) -> Result<Arc<dyn ObjectStorageApi>>;
    fn usage(&self) -> Result<Arc<dyn UsageApi>>;

    /// Tenancy OCID from the resolved configuration (may be empty)
    fn tenancy_id(&self) -> String;

    /// Configured region
    fn region(&self) -> String;

    /// `DEFAULT_COMPARTMENT_OCID`, when set
    fn default_compartment(&self) -> Option<String>;
}

/// Builds service clients from resolved credentials
#[derive(Clone)]
pub struct ClientFactory {
    config: OciConfig,
    signer: Arc<dyn RequestSigner>,
    http: reqwest::Client,
    endpoint_override: Option<String>,
    default_compartment: Option<String>,
}

impl ClientFactory {
    /// Use the delegated signer when present, else load the API key named by
    /// the configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the API key cannot be loaded.
    pub fn from_credentials(credentials: &ResolvedCredentials) -> Result<Self> {
        let signer: Arc<dyn RequestSigner> = match &credentials.signer {
            Some(signer) => signer.clone(),
            None => Arc::new(ApiKeySigner::from_config(&credentials.config)?),
        };
        debug!(mode = %credentials.mode, key_id = %signer.key_id(), "Client factory ready");
        Ok(Self::with_signer(credentials.config.clone(), signer))
    }

    /// Factory over an explicit signer
    pub fn with_signer(config: OciConfig, signer: Arc<dyn RequestSigner>) -> Self {
        Self {
            config,
            signer,
            http: reqwest::Client::new(),
            endpoint_override: None,
            default_compartment: None,
        }
    }

    /// Send every request to `endpoint` instead of the regional host
    pub fn with_endpoint_override(mut self, endpoint: Option<String>) -> Self {
        self.endpoint_override = endpoint.filter(|e| !e.is_empty());
        self
    }

    /// Compartment used when a tool call names none
    pub fn with_default_compartment(mut self, compartment: Option<String>) -> Self {
        self.default_compartment = compartment.filter(|c| !c.is_empty());
        self
    }

    /// Resolved configuration
    pub fn config(&self) -> &OciConfig {
        &self.config
    }

    /// Client for a case-insensitive service alias
    ///
    /// # Errors
    ///
    /// Unknown aliases are invalid arguments; the usage service is unavailable
    /// in builds without the `usage-api` feature.
    pub fn get_client(&self, service: &str) -> Result<ServiceClient> {
        let kind = ServiceKind::from_alias(service)?;
        Ok(match kind {
            ServiceKind::Identity => ServiceClient::Identity(self.identity_client()),
            ServiceKind::Compute => ServiceClient::Compute(self.compute_client()),
            ServiceKind::Network => ServiceClient::Network(self.network_client()),
            ServiceKind::Database => ServiceClient::Database(self.database_client()),
            ServiceKind::ObjectStorage => {
                ServiceClient::ObjectStorage(self.object_storage_client())
            }
            #[cfg(feature = "usage-api")]
            ServiceKind::Usage => ServiceClient::Usage(self.usage_client()),
            #[cfg(not(feature = "usage-api"))]
            ServiceKind::Usage => return Err(crate::error::OciMcpError::UsageApiUnavailable),
        })
    }

    fn http_client(&self, kind: ServiceKind) -> OciHttpClient {
        OciHttpClient::new(
            self.http.clone(),
            self.signer.clone(),
            kind.base_url(&self.config.region, self.endpoint_override.as_deref()),
        )
    }

    pub fn identity_client(&self) -> IdentityClient {
        IdentityClient::new(self.http_client(ServiceKind::Identity))
    }

    pub fn compute_client(&self) -> ComputeClient {
        ComputeClient::new(self.http_client(ServiceKind::Compute))
    }

    pub fn network_client(&self) -> VirtualNetworkClient {
        VirtualNetworkClient::new(self.http_client(ServiceKind::Network))
    }

    pub fn database_client(&self) -> DatabaseClient {
        DatabaseClient::new(self.http_client(ServiceKind::Database))
    }

    pub fn object_storage_client(&self) -> ObjectStorageClient {
        ObjectStorageClient::new(self.http_client(ServiceKind::ObjectStorage))
    }

    #[cfg(feature = "usage-api")]
    pub fn usage_client(&self) -> UsageClient {
        UsageClient::new(self.http_client(ServiceKind::Usage))
    }
}

impl CloudClients for ClientFactory {
    fn compute(&self) -> Result<Arc<dyn ComputeApi>> {
        Ok(Arc::new(self.compute_client()))
    }

    fn network(&self) -> Result<Arc<dyn NetworkApi>> {
        Ok(Arc::new(self.network_client()))
    }

    fn identity(&self) -> Result<Arc<dyn IdentityApi>> {
        Ok(Arc::new(self.identity_client()))
    }

    fn database(&self) -> Result<Arc<dyn DatabaseApi>> {
        Ok(Arc::new(self.database_client()))
    }

    fn object_storage(&self) -> Result<Arc<dyn ObjectStorageApi>> {
        Ok(Arc::new(self.object_storage_client()))
    }

    #[cfg(feature = "usage-api")]
    fn usage(&self) -> Result<Arc<dyn UsageApi>> {
        Ok(Arc::new(self.usage_client()))
    }

    #[cfg(not(feature = "usage-api"))]
    fn usage(&self) -> Result<Arc<dyn UsageApi>> {
        Err(crate::error::OciMcpError::UsageApiUnavailable)
    }

    fn tenancy_id(&self) -> String {
        self.config.tenancy.clone()
    }

    fn region(&self) -> String {
        self.config.region.clone()
    }

    fn default_compartment(&self) -> Option<String> {
        self.default_compartment.clone()
    }
}

impl fmt::Debug for ClientFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientFactory")
            .field("region", &self.config.region)
            .field("key_id", &self.signer.key_id())
            .field("endpoint_override", &self.endpoint_override)
            .field("default_compartment", &self.default_compartment)
            .finish()
    }
}
