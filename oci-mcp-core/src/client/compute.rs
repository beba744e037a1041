//! Compute service client

use super::transport::{ApiResponse, OciHttpClient, Query, segment};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Compute instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub shape: Option<String>,
    #[serde(default)]
    pub lifecycle_state: Option<String>,
    #[serde(default)]
    pub time_created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub compartment_id: String,
    #[serde(default)]
    pub availability_domain: Option<String>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
    #[serde(default)]
    pub extended_metadata: Option<Value>,
}

/// Attachment of a VNIC to an instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VnicAttachment {
    pub id: String,
    #[serde(default)]
    pub instance_id: Option<String>,
    #[serde(default)]
    pub vnic_id: Option<String>,
    #[serde(default)]
    pub lifecycle_state: Option<String>,
}

/// Status and headers of an instance action call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
}

impl<T> From<ApiResponse<T>> for ActionResponse {
    fn from(response: ApiResponse<T>) -> Self {
        Self {
            status: response.status,
            headers: response.headers,
        }
    }
}

/// Compute operations used by the tools
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// All instances in a compartment
    async fn list_instances(&self, compartment_id: &str) -> Result<Vec<Instance>>;

    /// One instance
    async fn get_instance(&self, instance_id: &str) -> Result<Instance>;

    /// All VNIC attachments of an instance, listed in `compartment_id`
    async fn list_vnic_attachments(
        &self,
        compartment_id: &str,
        instance_id: &str,
    ) -> Result<Vec<VnicAttachment>>;

    /// Power action (START, STOP, ...) on an instance
    async fn instance_action(&self, instance_id: &str, action: &str) -> Result<ActionResponse>;
}

/// REST client for the compute service
#[derive(Debug, Clone)]
pub struct ComputeClient {
    http: OciHttpClient,
}

impl ComputeClient {
    pub fn new(http: OciHttpClient) -> Self {
        Self { http }
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }
}

#[async_trait]
impl ComputeApi for ComputeClient {
    async fn list_instances(&self, compartment_id: &str) -> Result<Vec<Instance>> {
        self.http
            .list_all("/instances", &vec![("compartmentId", compartment_id.to_string())])
            .await
    }

    async fn get_instance(&self, instance_id: &str) -> Result<Instance> {
        let path = format!("/instances/{}", segment(instance_id));
        Ok(self.http.get(&path, &Query::new()).await?.data)
    }

    async fn list_vnic_attachments(
        &self,
        compartment_id: &str,
        instance_id: &str,
    ) -> Result<Vec<VnicAttachment>> {
        self.http
            .list_all(
                "/vnicAttachments",
                &vec![
                    ("compartmentId", compartment_id.to_string()),
                    ("instanceId", instance_id.to_string()),
                ],
            )
            .await
    }

    async fn instance_action(&self, instance_id: &str, action: &str) -> Result<ActionResponse> {
        let path = format!("/instances/{}", segment(instance_id));
        let response = self
            .http
            .post_empty(&path, &vec![("action", action.to_string())])
            .await?;
        Ok(response.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::tests::test_signer;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ComputeClient {
        ComputeClient::new(OciHttpClient::new(
            reqwest::Client::new(),
            test_signer(),
            format!("{}/20160918", server.uri()),
        ))
    }

    #[test]
    fn test_instance_deserializes_camel_case() {
        let instance: Instance = serde_json::from_value(json!({
            "id": "ocid1.instance.oc1..a",
            "displayName": "web-1",
            "shape": "VM.Standard.E4.Flex",
            "lifecycleState": "RUNNING",
            "timeCreated": "2024-03-01T10:00:00.123Z",
            "compartmentId": "ocid1.compartment.oc1..c",
            "availabilityDomain": "AD-1",
            "metadata": {"ssh_authorized_keys": "ssh-rsa AAA"},
            "extendedMetadata": {"nested": {"k": "v"}}
        }))
        .unwrap();

        assert_eq!(instance.display_name.as_deref(), Some("web-1"));
        assert_eq!(instance.lifecycle_state.as_deref(), Some("RUNNING"));
        assert!(instance.time_created.is_some());
        assert_eq!(
            instance.metadata.unwrap()["ssh_authorized_keys"],
            "ssh-rsa AAA"
        );
    }

    #[tokio::test]
    async fn test_instance_action_posts_action_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/20160918/instances/ocid1.instance.oc1..a"))
            .and(query_param("action", "STOP"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("etag", "abc")
                    .set_body_json(json!({"id": "ocid1.instance.oc1..a"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let response = client(&server)
            .instance_action("ocid1.instance.oc1..a", "STOP")
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.headers.get("etag").map(String::as_str), Some("abc"));
    }

    #[tokio::test]
    async fn test_list_vnic_attachments_scoped_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/20160918/vnicAttachments"))
            .and(query_param("compartmentId", "ocid1.c"))
            .and(query_param("instanceId", "ocid1.i"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "att1", "instanceId": "ocid1.i", "vnicId": "ocid1.vnic1"}
            ])))
            .mount(&server)
            .await;

        let attachments = client(&server)
            .list_vnic_attachments("ocid1.c", "ocid1.i")
            .await
            .unwrap();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].vnic_id.as_deref(), Some("ocid1.vnic1"));
    }
}
