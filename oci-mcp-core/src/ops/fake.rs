//! In-memory cloud used by operation and tool tests

use crate::client::{
    ActionResponse, AutonomousDatabase, BucketSummary, CloudClients, Compartment, ComputeApi,
    DatabaseApi, IdentityApi, Instance, NetworkApi, NetworkSecurityGroup, ObjectStorageApi,
    RequestSummarizedUsagesDetails, SecurityList, SecurityRule, Tenancy, UsageAggregation,
    UsageApi, Vcn, Vnic, VnicAttachment,
};
use crate::error::{OciMcpError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub(crate) struct FakeCloud {
    pub tenancy: String,
    pub default_compartment: Option<String>,
    pub instances: Vec<Instance>,
    pub attachments: Vec<VnicAttachment>,
    pub vnics: HashMap<String, Vnic>,
    pub vcns: Vec<Vcn>,
    pub security_lists: Vec<SecurityList>,
    pub nsgs: Vec<NetworkSecurityGroup>,
    pub nsg_rules: HashMap<String, Vec<SecurityRule>>,
    pub compartments: Vec<Compartment>,
    pub databases: Vec<AutonomousDatabase>,
    pub namespace: String,
    pub buckets: Vec<BucketSummary>,
    pub usage_items: Vec<Value>,
    pub usage_unavailable: bool,
    /// Every API call as `"method arg..."`
    pub calls: Arc<Mutex<Vec<String>>>,
    pub usage_requests: Arc<Mutex<Vec<RequestSummarizedUsagesDetails>>>,
}

impl FakeCloud {
    pub fn new(tenancy: &str) -> Self {
        Self {
            tenancy: tenancy.to_string(),
            namespace: "fake-ns".to_string(),
            ..Default::default()
        }
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn with_instance(mut self, id: &str, name: &str, compartment: &str, state: &str) -> Self {
        self.instances.push(Instance {
            id: id.to_string(),
            display_name: Some(name.to_string()),
            shape: Some("VM.Standard.E4.Flex".to_string()),
            lifecycle_state: Some(state.to_string()),
            compartment_id: compartment.to_string(),
            availability_domain: Some("AD-1".to_string()),
            ..Default::default()
        });
        self
    }

    pub fn with_vnic(mut self, instance_id: &str, vnic_id: &str, public_ip: Option<&str>) -> Self {
        self.attachments.push(VnicAttachment {
            id: format!("att-{}", vnic_id),
            instance_id: Some(instance_id.to_string()),
            vnic_id: Some(vnic_id.to_string()),
            lifecycle_state: Some("ATTACHED".to_string()),
        });
        self.vnics.insert(
            vnic_id.to_string(),
            Vnic {
                id: vnic_id.to_string(),
                display_name: Some(format!("{}-nic", instance_id)),
                hostname_label: Some("host".to_string()),
                private_ip: Some("10.0.0.2".to_string()),
                public_ip: public_ip.map(str::to_string),
                subnet_id: Some("ocid1.subnet".to_string()),
                is_primary: Some(true),
            },
        );
        self
    }
}

#[async_trait]
impl ComputeApi for FakeCloud {
    async fn list_instances(&self, compartment_id: &str) -> Result<Vec<Instance>> {
        self.record(format!("list_instances {}", compartment_id));
        Ok(self
            .instances
            .iter()
            .filter(|i| i.compartment_id == compartment_id)
            .cloned()
            .collect())
    }

    async fn get_instance(&self, instance_id: &str) -> Result<Instance> {
        self.record(format!("get_instance {}", instance_id));
        self.instances
            .iter()
            .find(|i| i.id == instance_id)
            .cloned()
            .ok_or_else(|| OciMcpError::Service {
                status: 404,
                code: "NotAuthorizedOrNotFound".to_string(),
                message: format!("instance {} not found", instance_id),
                opc_request_id: None,
            })
    }

    async fn list_vnic_attachments(
        &self,
        compartment_id: &str,
        instance_id: &str,
    ) -> Result<Vec<VnicAttachment>> {
        self.record(format!("list_vnic_attachments {} {}", compartment_id, instance_id));
        Ok(self
            .attachments
            .iter()
            .filter(|a| a.instance_id.as_deref() == Some(instance_id))
            .cloned()
            .collect())
    }

    async fn instance_action(&self, instance_id: &str, action: &str) -> Result<ActionResponse> {
        self.record(format!("instance_action {} {}", instance_id, action));
        let mut headers = BTreeMap::new();
        headers.insert("opc-request-id".to_string(), "fake-req".to_string());
        Ok(ActionResponse {
            status: 200,
            headers,
        })
    }
}

#[async_trait]
impl NetworkApi for FakeCloud {
    async fn get_vnic(&self, vnic_id: &str) -> Result<Vnic> {
        self.record(format!("get_vnic {}", vnic_id));
        self.vnics
            .get(vnic_id)
            .cloned()
            .ok_or_else(|| OciMcpError::Other(format!("no vnic {}", vnic_id)))
    }

    async fn list_vcns(&self, compartment_id: &str) -> Result<Vec<Vcn>> {
        self.record(format!("list_vcns {}", compartment_id));
        Ok(self.vcns.clone())
    }

    async fn list_security_lists(
        &self,
        compartment_id: &str,
        vcn_id: &str,
    ) -> Result<Vec<SecurityList>> {
        self.record(format!("list_security_lists {} {}", compartment_id, vcn_id));
        Ok(self
            .security_lists
            .iter()
            .filter(|s| s.vcn_id.as_deref() == Some(vcn_id))
            .cloned()
            .collect())
    }

    async fn list_network_security_groups(
        &self,
        compartment_id: &str,
        vcn_id: &str,
    ) -> Result<Vec<NetworkSecurityGroup>> {
        self.record(format!("list_network_security_groups {} {}", compartment_id, vcn_id));
        Ok(self
            .nsgs
            .iter()
            .filter(|n| n.vcn_id.as_deref() == Some(vcn_id))
            .cloned()
            .collect())
    }

    async fn list_network_security_group_rules(&self, nsg_id: &str) -> Result<Vec<SecurityRule>> {
        self.record(format!("list_network_security_group_rules {}", nsg_id));
        Ok(self.nsg_rules.get(nsg_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl IdentityApi for FakeCloud {
    async fn list_compartments(&self, compartment_id: &str) -> Result<Vec<Compartment>> {
        self.record(format!("list_compartments {}", compartment_id));
        Ok(self.compartments.clone())
    }

    async fn get_tenancy(&self, tenancy_id: &str) -> Result<Tenancy> {
        self.record(format!("get_tenancy {}", tenancy_id));
        Ok(Tenancy {
            id: tenancy_id.to_string(),
            name: "fake".to_string(),
            home_region_key: Some("IAD".to_string()),
            description: None,
        })
    }
}

#[async_trait]
impl DatabaseApi for FakeCloud {
    async fn list_autonomous_databases(
        &self,
        compartment_id: &str,
    ) -> Result<Vec<AutonomousDatabase>> {
        self.record(format!("list_autonomous_databases {}", compartment_id));
        Ok(self.databases.clone())
    }
}

#[async_trait]
impl ObjectStorageApi for FakeCloud {
    async fn get_namespace(&self) -> Result<String> {
        self.record("get_namespace".to_string());
        Ok(self.namespace.clone())
    }

    async fn list_buckets(
        &self,
        namespace: &str,
        compartment_id: &str,
    ) -> Result<Vec<BucketSummary>> {
        self.record(format!("list_buckets {} {}", namespace, compartment_id));
        Ok(self.buckets.clone())
    }
}

#[async_trait]
impl UsageApi for FakeCloud {
    async fn request_summarized_usages(
        &self,
        details: &RequestSummarizedUsagesDetails,
    ) -> Result<UsageAggregation> {
        self.record("request_summarized_usages".to_string());
        self.usage_requests.lock().unwrap().push(details.clone());
        Ok(UsageAggregation {
            items: self.usage_items.clone(),
        })
    }
}

impl CloudClients for FakeCloud {
    fn compute(&self) -> Result<Arc<dyn ComputeApi>> {
        Ok(Arc::new(self.clone()))
    }

    fn network(&self) -> Result<Arc<dyn NetworkApi>> {
        Ok(Arc::new(self.clone()))
    }

    fn identity(&self) -> Result<Arc<dyn IdentityApi>> {
        Ok(Arc::new(self.clone()))
    }

    fn database(&self) -> Result<Arc<dyn DatabaseApi>> {
        Ok(Arc::new(self.clone()))
    }

    fn object_storage(&self) -> Result<Arc<dyn ObjectStorageApi>> {
        Ok(Arc::new(self.clone()))
    }

    fn usage(&self) -> Result<Arc<dyn UsageApi>> {
        if self.usage_unavailable {
            return Err(OciMcpError::UsageApiUnavailable);
        }
        Ok(Arc::new(self.clone()))
    }

    fn tenancy_id(&self) -> String {
        self.tenancy.clone()
    }

    fn region(&self) -> String {
        "us-ashburn-1".to_string()
    }

    fn default_compartment(&self) -> Option<String> {
        self.default_compartment.clone()
    }
}
