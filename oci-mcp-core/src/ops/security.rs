//! Read-only security posture heuristics
//!
//! Flags instances with a public IP, security list ingress rules open to
//! `0.0.0.0/0`, and NSG ingress rules open to `0.0.0.0/0`.

use super::{ANYWHERE_CIDR, resolve_compartment};
use crate::client::CloudClients;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicInstanceFinding {
    pub instance_id: String,
    pub name: Option<String>,
    pub public_ip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityListFinding {
    pub security_list_id: String,
    pub vcn: Option<String>,
    pub proto: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NsgFinding {
    pub nsg_id: String,
    pub name: Option<String>,
    pub proto: String,
}

/// Result of `perform_security_assessment`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityFindings {
    pub public_instances: Vec<PublicInstanceFinding>,
    pub wide_open_nsg_rules: Vec<NsgFinding>,
    pub wide_open_sec_list_rules: Vec<SecurityListFinding>,
}

impl SecurityFindings {
    pub fn total(&self) -> usize {
        self.public_instances.len()
            + self.wide_open_nsg_rules.len()
            + self.wide_open_sec_list_rules.len()
    }
}

pub async fn perform_security_assessment(
    clients: &dyn CloudClients,
    compartment_ocid: Option<&str>,
) -> Result<SecurityFindings> {
    let compartment = resolve_compartment(clients, compartment_ocid)?;
    let compute = clients.compute()?;
    let network = clients.network()?;

    let mut findings = SecurityFindings::default();

    // Attachments are listed in the scope compartment, not the instance's own
    for instance in compute.list_instances(&compartment).await? {
        for attachment in compute
            .list_vnic_attachments(&compartment, &instance.id)
            .await?
        {
            let Some(vnic_id) = attachment.vnic_id else {
                continue;
            };
            let vnic = network.get_vnic(&vnic_id).await?;
            if let Some(public_ip) = vnic.public_ip.filter(|ip| !ip.is_empty()) {
                findings.public_instances.push(PublicInstanceFinding {
                    instance_id: instance.id.clone(),
                    name: instance.display_name.clone(),
                    public_ip,
                });
            }
        }
    }

    for vcn in network.list_vcns(&compartment).await? {
        for list in network.list_security_lists(&compartment, &vcn.id).await? {
            for rule in list.ingress_security_rules.unwrap_or_default() {
                if rule.source.as_deref() == Some(ANYWHERE_CIDR) {
                    findings.wide_open_sec_list_rules.push(SecurityListFinding {
                        security_list_id: list.id.clone(),
                        vcn: vcn.display_name.clone(),
                        proto: rule.protocol,
                    });
                }
            }
        }

        for nsg in network
            .list_network_security_groups(&compartment, &vcn.id)
            .await?
        {
            for rule in network.list_network_security_group_rules(&nsg.id).await? {
                if rule.is_ingress() && rule.source.as_deref() == Some(ANYWHERE_CIDR) {
                    findings.wide_open_nsg_rules.push(NsgFinding {
                        nsg_id: nsg.id.clone(),
                        name: nsg.display_name.clone(),
                        proto: rule.protocol,
                    });
                }
            }
        }
    }

    debug!(compartment = %compartment, findings = findings.total(), "Security assessment complete");
    Ok(findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{IngressSecurityRule, NetworkSecurityGroup, SecurityList, SecurityRule, Vcn};
    use crate::ops::fake::FakeCloud;

    fn vcn(cloud: &mut FakeCloud) {
        cloud.vcns.push(Vcn {
            id: "ocid1.vcn".into(),
            display_name: Some("main-vcn".into()),
            ..Default::default()
        });
    }

    #[tokio::test]
    async fn test_one_public_instance_and_one_open_security_list_rule() {
        let mut cloud = FakeCloud::new("ocid1.tenancy")
            .with_instance("ocid1.i1", "web", "ocid1.tenancy", "RUNNING")
            .with_vnic("ocid1.i1", "ocid1.vnic1", Some("198.51.100.4"))
            .with_instance("ocid1.i2", "db", "ocid1.tenancy", "RUNNING")
            .with_vnic("ocid1.i2", "ocid1.vnic2", None);
        vcn(&mut cloud);
        cloud.security_lists.push(SecurityList {
            id: "ocid1.seclist".into(),
            vcn_id: Some("ocid1.vcn".into()),
            ingress_security_rules: Some(vec![
                IngressSecurityRule {
                    protocol: "6".into(),
                    source: Some("0.0.0.0/0".into()),
                    ..Default::default()
                },
                IngressSecurityRule {
                    protocol: "all".into(),
                    source: Some("10.0.0.0/16".into()),
                    ..Default::default()
                },
            ]),
            ..Default::default()
        });

        let findings = perform_security_assessment(&cloud, None).await.unwrap();

        assert_eq!(
            findings.public_instances,
            vec![PublicInstanceFinding {
                instance_id: "ocid1.i1".into(),
                name: Some("web".into()),
                public_ip: "198.51.100.4".into(),
            }]
        );
        assert_eq!(
            findings.wide_open_sec_list_rules,
            vec![SecurityListFinding {
                security_list_id: "ocid1.seclist".into(),
                vcn: Some("main-vcn".into()),
                proto: "6".into(),
            }]
        );
        assert!(findings.wide_open_nsg_rules.is_empty());
    }

    #[tokio::test]
    async fn test_nsg_rules_ingress_only() {
        let mut cloud = FakeCloud::new("ocid1.tenancy");
        vcn(&mut cloud);
        cloud.nsgs.push(NetworkSecurityGroup {
            id: "ocid1.nsg".into(),
            display_name: Some("web-nsg".into()),
            vcn_id: Some("ocid1.vcn".into()),
        });
        cloud.nsg_rules.insert(
            "ocid1.nsg".into(),
            vec![
                SecurityRule {
                    direction: Some("INGRESS".into()),
                    protocol: "6".into(),
                    source: Some("0.0.0.0/0".into()),
                    ..Default::default()
                },
                // Missing direction counts as ingress
                SecurityRule {
                    protocol: "17".into(),
                    source: Some("0.0.0.0/0".into()),
                    ..Default::default()
                },
                SecurityRule {
                    direction: Some("EGRESS".into()),
                    protocol: "all".into(),
                    source: Some("0.0.0.0/0".into()),
                    ..Default::default()
                },
            ],
        );

        let findings = perform_security_assessment(&cloud, Some("ocid1.tenancy"))
            .await
            .unwrap();
        let protos: Vec<&str> = findings
            .wide_open_nsg_rules
            .iter()
            .map(|f| f.proto.as_str())
            .collect();
        assert_eq!(protos, vec!["6", "17"]);
        assert_eq!(findings.wide_open_nsg_rules[0].name.as_deref(), Some("web-nsg"));
        assert!(findings.public_instances.is_empty());
    }

    #[tokio::test]
    async fn test_attachments_listed_in_scope_compartment() {
        let cloud = FakeCloud::new("ocid1.tenancy")
            .with_instance("ocid1.i1", "web", "ocid1.scope", "RUNNING")
            .with_vnic("ocid1.i1", "ocid1.vnic1", None);

        perform_security_assessment(&cloud, Some("ocid1.scope"))
            .await
            .unwrap();
        assert!(
            cloud
                .calls()
                .contains(&"list_vnic_attachments ocid1.scope ocid1.i1".to_string())
        );
    }
}
