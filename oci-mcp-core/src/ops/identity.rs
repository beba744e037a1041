//! Compartment listing

use crate::client::CloudClients;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// One row of `list_compartments`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompartmentSummary {
    pub id: String,
    pub name: String,
    pub lifecycle_state: Option<String>,
    pub is_accessible: Option<bool>,
}

/// Accessible compartments in the whole tenancy subtree
pub async fn list_compartments(clients: &dyn CloudClients) -> Result<Vec<CompartmentSummary>> {
    let identity = clients.identity()?;
    let tenancy = clients.tenancy_id();

    Ok(identity
        .list_compartments(&tenancy)
        .await?
        .into_iter()
        .map(|c| CompartmentSummary {
            id: c.id,
            name: c.name,
            lifecycle_state: c.lifecycle_state,
            is_accessible: c.is_accessible,
        })
        .collect())
}
