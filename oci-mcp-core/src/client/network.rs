//! Virtual cloud network client

use super::transport::{OciHttpClient, Query, segment};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Virtual network interface card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vnic {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub hostname_label: Option<String>,
    #[serde(default)]
    pub private_ip: Option<String>,
    #[serde(default)]
    pub public_ip: Option<String>,
    #[serde(default)]
    pub subnet_id: Option<String>,
    #[serde(default)]
    pub is_primary: Option<bool>,
}

/// Virtual cloud network
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vcn {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub cidr_block: Option<String>,
    #[serde(default)]
    pub lifecycle_state: Option<String>,
}

/// Stateful or stateless ingress rule of a security list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressSecurityRule {
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub is_stateless: Option<bool>,
}

/// Security list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityList {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub vcn_id: Option<String>,
    #[serde(default)]
    pub ingress_security_rules: Option<Vec<IngressSecurityRule>>,
}

/// Network security group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSecurityGroup {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub vcn_id: Option<String>,
}

/// Rule of a network security group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityRule {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub source_type: Option<String>,
}

impl SecurityRule {
    /// Rules without a direction count as ingress
    pub fn is_ingress(&self) -> bool {
        self.direction.as_deref().unwrap_or("INGRESS") == "INGRESS"
    }
}

/// Network operations used by the tools
#[async_trait]
pub trait NetworkApi: Send + Sync {
    async fn get_vnic(&self, vnic_id: &str) -> Result<Vnic>;

    async fn list_vcns(&self, compartment_id: &str) -> Result<Vec<Vcn>>;

    async fn list_security_lists(&self, compartment_id: &str, vcn_id: &str)
    -> Result<Vec<SecurityList>>;

    async fn list_network_security_groups(
        &self,
        compartment_id: &str,
        vcn_id: &str,
    ) -> Result<Vec<NetworkSecurityGroup>>;

    async fn list_network_security_group_rules(&self, nsg_id: &str) -> Result<Vec<SecurityRule>>;
}

/// REST client for the virtual network service
#[derive(Debug, Clone)]
pub struct VirtualNetworkClient {
    http: OciHttpClient,
}

impl VirtualNetworkClient {
    pub fn new(http: OciHttpClient) -> Self {
        Self { http }
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }
}

fn scoped(compartment_id: &str, vcn_id: &str) -> Query {
    vec![
        ("compartmentId", compartment_id.to_string()),
        ("vcnId", vcn_id.to_string()),
    ]
}

#[async_trait]
impl NetworkApi for VirtualNetworkClient {
    async fn get_vnic(&self, vnic_id: &str) -> Result<Vnic> {
        let path = format!("/vnics/{}", segment(vnic_id));
        Ok(self.http.get(&path, &Query::new()).await?.data)
    }

    async fn list_vcns(&self, compartment_id: &str) -> Result<Vec<Vcn>> {
        self.http
            .list_all("/vcns", &vec![("compartmentId", compartment_id.to_string())])
            .await
    }

    async fn list_security_lists(
        &self,
        compartment_id: &str,
        vcn_id: &str,
    ) -> Result<Vec<SecurityList>> {
        self.http
            .list_all("/securityLists", &scoped(compartment_id, vcn_id))
            .await
    }

    async fn list_network_security_groups(
        &self,
        compartment_id: &str,
        vcn_id: &str,
    ) -> Result<Vec<NetworkSecurityGroup>> {
        self.http
            .list_all("/networkSecurityGroups", &scoped(compartment_id, vcn_id))
            .await
    }

    async fn list_network_security_group_rules(&self, nsg_id: &str) -> Result<Vec<SecurityRule>> {
        let path = format!("/networkSecurityGroups/{}/securityRules", segment(nsg_id));
        self.http.list_all(&path, &Query::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_security_rule_direction_defaults_to_ingress() {
        let rule: SecurityRule =
            serde_json::from_value(json!({"protocol": "6", "source": "0.0.0.0/0"})).unwrap();
        assert!(rule.is_ingress());

        let egress: SecurityRule =
            serde_json::from_value(json!({"protocol": "all", "direction": "EGRESS"})).unwrap();
        assert!(!egress.is_ingress());
    }

    #[test]
    fn test_security_list_rules() {
        let list: SecurityList = serde_json::from_value(json!({
            "id": "ocid1.securitylist",
            "ingressSecurityRules": [
                {"protocol": "6", "source": "0.0.0.0/0", "isStateless": false},
                {"protocol": "1", "source": "10.0.0.0/16"}
            ]
        }))
        .unwrap();
        let rules = list.ingress_security_rules.unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].source.as_deref(), Some("0.0.0.0/0"));
    }
}
