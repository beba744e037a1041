//! OCI REST clients
//!
//! A minimal signed transport plus one client per service, limited to the
//! calls the tools make.

pub mod compute;
pub mod database;
pub mod factory;
pub mod identity;
pub mod network;
pub mod object_storage;
pub mod service;
pub mod transport;
pub mod usage;

pub use compute::{ActionResponse, ComputeApi, ComputeClient, Instance, VnicAttachment};
pub use database::{AutonomousDatabase, DatabaseApi, DatabaseClient};
pub use factory::{ClientFactory, CloudClients, ServiceClient};
pub use identity::{Compartment, IdentityApi, IdentityClient, Tenancy};
pub use network::{
    IngressSecurityRule, NetworkApi, NetworkSecurityGroup, SecurityList, SecurityRule, Vcn,
    VirtualNetworkClient, Vnic,
};
pub use object_storage::{BucketSummary, ObjectStorageApi, ObjectStorageClient};
pub use service::ServiceKind;
pub use transport::{ApiResponse, OciHttpClient};
#[cfg(feature = "usage-api")]
pub use usage::UsageClient;
pub use usage::{RequestSummarizedUsagesDetails, UsageAggregation, UsageApi};
