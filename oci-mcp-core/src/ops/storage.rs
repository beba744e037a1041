//! Object storage bucket listing

use super::{resolve_compartment, rfc3339};
use crate::client::CloudClients;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// One row of `list_storage_buckets`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketRecord {
    pub name: String,
    pub created: Option<String>,
    pub namespace: String,
}

/// Fetch the tenancy namespace, then list every bucket in the compartment
pub async fn list_storage_buckets(
    clients: &dyn CloudClients,
    compartment_ocid: Option<&str>,
) -> Result<Vec<BucketRecord>> {
    let compartment = resolve_compartment(clients, compartment_ocid)?;
    let storage = clients.object_storage()?;

    let namespace = storage.get_namespace().await?;
    let buckets = storage.list_buckets(&namespace, &compartment).await?;

    Ok(buckets
        .into_iter()
        .map(|b| BucketRecord {
            name: b.name,
            created: rfc3339(b.time_created),
            namespace: namespace.clone(),
        })
        .collect())
}
