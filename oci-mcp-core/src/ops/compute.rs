//! Compute instance operations

use super::{resolve_compartment, rfc3339};
use crate::client::{ActionResponse, CloudClients, Instance};
use crate::error::{OciMcpError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

/// Power actions accepted by [`instance_action`], sorted
pub const ALLOWED_ACTIONS: [&str; 5] = ["RESET", "SOFTRESET", "SOFTSTOP", "START", "STOP"];

/// One row of `list_compute_instances`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceSummary {
    pub id: String,
    pub display_name: Option<String>,
    pub shape: Option<String>,
    pub lifecycle_state: Option<String>,
    pub time_created: Option<String>,
    pub compartment_id: String,
    pub availability_domain: Option<String>,
}

impl From<Instance> for InstanceSummary {
    fn from(instance: Instance) -> Self {
        Self {
            id: instance.id,
            display_name: instance.display_name,
            shape: instance.shape,
            lifecycle_state: instance.lifecycle_state,
            time_created: rfc3339(instance.time_created),
            compartment_id: instance.compartment_id,
            availability_domain: instance.availability_domain,
        }
    }
}

/// VNIC attached to an instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VnicDetails {
    pub id: String,
    pub display_name: Option<String>,
    pub hostname_label: Option<String>,
    pub private_ip: Option<String>,
    pub public_ip: Option<String>,
    pub subnet_id: Option<String>,
    pub is_primary: Option<bool>,
}

/// Result of `get_instance_details`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceDetails {
    pub id: String,
    pub display_name: Option<String>,
    pub shape: Option<String>,
    pub lifecycle_state: Option<String>,
    pub time_created: Option<String>,
    pub metadata: Option<HashMap<String, String>>,
    pub extended_metadata: Option<Value>,
    pub vnics: Vec<VnicDetails>,
}

/// Instances in a compartment, optionally keeping only one lifecycle state.
///
/// The state filter is an exact, case-sensitive match.
pub async fn list_compute_instances(
    clients: &dyn CloudClients,
    compartment_ocid: Option<&str>,
    lifecycle_state: Option<&str>,
) -> Result<Vec<InstanceSummary>> {
    let compartment = resolve_compartment(clients, compartment_ocid)?;
    let compute = clients.compute()?;

    let instances = compute.list_instances(&compartment).await?;
    debug!(compartment = %compartment, count = instances.len(), "Listed instances");

    Ok(instances
        .into_iter()
        .filter(|i| match lifecycle_state.filter(|s| !s.is_empty()) {
            Some(state) => i.lifecycle_state.as_deref() == Some(state),
            None => true,
        })
        .map(InstanceSummary::from)
        .collect())
}

/// One instance plus its VNICs, found through attachments listed in the
/// instance's own compartment
pub async fn get_instance_details(
    clients: &dyn CloudClients,
    instance_id: &str,
) -> Result<InstanceDetails> {
    let compute = clients.compute()?;
    let network = clients.network()?;

    let instance = compute.get_instance(instance_id).await?;
    let attachments = compute
        .list_vnic_attachments(&instance.compartment_id, &instance.id)
        .await?;

    let mut vnics = Vec::with_capacity(attachments.len());
    for attachment in attachments {
        let Some(vnic_id) = attachment.vnic_id else {
            continue;
        };
        let vnic = network.get_vnic(&vnic_id).await?;
        vnics.push(VnicDetails {
            id: vnic.id,
            display_name: vnic.display_name,
            hostname_label: vnic.hostname_label,
            private_ip: vnic.private_ip,
            public_ip: vnic.public_ip,
            subnet_id: vnic.subnet_id,
            is_primary: vnic.is_primary,
        });
    }

    Ok(InstanceDetails {
        id: instance.id,
        display_name: instance.display_name,
        shape: instance.shape,
        lifecycle_state: instance.lifecycle_state,
        time_created: rfc3339(instance.time_created),
        metadata: instance.metadata,
        extended_metadata: instance.extended_metadata,
        vnics,
    })
}

/// Upper-case `action` and check it against [`ALLOWED_ACTIONS`]
pub fn normalize_action(action: &str) -> Result<String> {
    let upper = action.to_uppercase();
    if ALLOWED_ACTIONS.contains(&upper.as_str()) {
        Ok(upper)
    } else {
        Err(OciMcpError::invalid_argument(format!(
            "Invalid action '{}'. Allowed: [{}]",
            upper,
            ALLOWED_ACTIONS
                .iter()
                .map(|a| format!("'{}'", a))
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }
}

/// Run a power action on an instance. The action is validated before any
/// client is created.
pub async fn instance_action(
    clients: &dyn CloudClients,
    instance_id: &str,
    action: &str,
) -> Result<ActionResponse> {
    let action = normalize_action(action)?;
    let compute = clients.compute()?;

    info!(instance_id, action = %action, "Instance action");
    compute.instance_action(instance_id, &action).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::fake::FakeCloud;

    fn cloud() -> FakeCloud {
        FakeCloud::new("ocid1.tenancy")
            .with_instance("ocid1.i1", "web", "ocid1.tenancy", "RUNNING")
            .with_instance("ocid1.i2", "batch", "ocid1.tenancy", "STOPPED")
            .with_instance("ocid1.i3", "other", "ocid1.elsewhere", "RUNNING")
    }

    #[tokio::test]
    async fn test_list_defaults_to_tenancy() {
        let cloud = cloud();
        let instances = list_compute_instances(&cloud, None, None).await.unwrap();
        let ids: Vec<&str> = instances.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["ocid1.i1", "ocid1.i2"]);
        assert_eq!(instances[0].availability_domain.as_deref(), Some("AD-1"));
    }

    #[tokio::test]
    async fn test_lifecycle_filter_is_exact() {
        let cloud = cloud();
        let running = list_compute_instances(&cloud, None, Some("RUNNING")).await.unwrap();
        assert_eq!(running.len(), 1);
        assert_eq!(running[0].id, "ocid1.i1");

        let lower = list_compute_instances(&cloud, None, Some("running")).await.unwrap();
        assert!(lower.is_empty());
    }

    #[tokio::test]
    async fn test_instance_details_with_vnics() {
        let cloud = FakeCloud::new("ocid1.tenancy")
            .with_instance("ocid1.i1", "web", "ocid1.comp", "RUNNING")
            .with_vnic("ocid1.i1", "ocid1.vnic1", Some("203.0.113.7"));

        let details = get_instance_details(&cloud, "ocid1.i1").await.unwrap();
        assert_eq!(details.display_name.as_deref(), Some("web"));
        assert_eq!(details.vnics.len(), 1);
        assert_eq!(details.vnics[0].public_ip.as_deref(), Some("203.0.113.7"));
        assert!(
            cloud
                .calls()
                .contains(&"list_vnic_attachments ocid1.comp ocid1.i1".to_string())
        );
    }

    #[tokio::test]
    async fn test_invalid_action_rejected_before_call() {
        let cloud = cloud();
        let err = instance_action(&cloud, "ocid1.i1", "destroy").await.unwrap_err();
        assert!(matches!(err, OciMcpError::InvalidArgument(_)));
        assert_eq!(
            err.to_string(),
            "Invalid argument: Invalid action 'DESTROY'. Allowed: ['RESET', 'SOFTRESET', 'SOFTSTOP', 'START', 'STOP']"
        );
        assert!(cloud.calls().is_empty());
    }

    #[tokio::test]
    async fn test_action_is_upper_cased() {
        let cloud = cloud();
        let response = instance_action(&cloud, "ocid1.i1", "start").await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(cloud.calls(), vec!["instance_action ocid1.i1 START".to_string()]);
    }
}
