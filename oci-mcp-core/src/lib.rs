//! # oci-mcp - Oracle Cloud Infrastructure over the Model Context Protocol
//!
//! An MCP server that lets an assistant inspect and lightly operate an OCI
//! tenancy:
//! - Compute inventory, instance details and power actions
//! - Autonomous databases, buckets and compartments
//! - Read-only security posture heuristics
//! - Tenancy cost summaries from the Usage API
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oci_mcp_core::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     let credentials = resolve_credentials()?;
//!     let clients = ClientFactory::from_credentials(credentials)?
//!         .with_default_compartment(config.default_compartment.clone());
//!
//!     let server = McpServer::from_config(&config, Arc::new(clients))?;
//!     server.run(StdioTransport::new()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Authentication
//!
//! Credentials are resolved once per process, trying in order the OCI config
//! file profile, the five explicit `OCI_*` variables, and the resource
//! principal of the surrounding workload.
//!
//! ## Feature Flags
//!
//! - `usage-api` (default): Usage API client used by `get_tenancy_cost_summary`

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod mcp;
pub mod ops;
pub mod skills;
pub mod tools;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::auth::{
        AuthMode, CredentialResolver, OciConfig, RequestSigner, ResolvedCredentials,
        resolve_credentials,
    };
    pub use crate::client::{ClientFactory, CloudClients, ServiceClient, ServiceKind};
    pub use crate::config::ServerConfig;
    pub use crate::error::{OciMcpError, Result};
    pub use crate::mcp::{
        CompartmentsResource, McpServer, McpServerBuilder, ResourceProvider, StdioTransport,
        Transport,
    };
    pub use crate::ops::{
        CompartmentSummary, CostSummary, InstanceDetails, InstanceSummary, SecurityFindings,
    };
    pub use crate::skills::{PromptTemplate, Skill, create_oci_skill};
    pub use crate::tools::{
        Capability, CapabilityPolicy, CapabilitySet, Tool, ToolError, ToolErrorKind,
        ToolRegistry, ToolResultEnvelope,
    };
}
