//! Identity service client

use super::transport::{OciHttpClient, Query, segment};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Compartment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compartment {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub compartment_id: Option<String>,
    #[serde(default)]
    pub lifecycle_state: Option<String>,
    #[serde(default)]
    pub is_accessible: Option<bool>,
}

/// Tenancy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenancy {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub home_region_key: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Identity operations
#[async_trait]
pub trait IdentityApi: Send + Sync {
    /// Accessible compartments below `compartment_id`, whole subtree
    async fn list_compartments(&self, compartment_id: &str) -> Result<Vec<Compartment>>;

    /// Tenancy record
    async fn get_tenancy(&self, tenancy_id: &str) -> Result<Tenancy>;
}

/// REST client for the identity service
#[derive(Debug, Clone)]
pub struct IdentityClient {
    http: OciHttpClient,
}

impl IdentityClient {
    pub fn new(http: OciHttpClient) -> Self {
        Self { http }
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }
}

#[async_trait]
impl IdentityApi for IdentityClient {
    async fn list_compartments(&self, compartment_id: &str) -> Result<Vec<Compartment>> {
        self.http
            .list_all(
                "/compartments",
                &vec![
                    ("compartmentId", compartment_id.to_string()),
                    ("compartmentIdInSubtree", "true".to_string()),
                    ("accessLevel", "ACCESSIBLE".to_string()),
                ],
            )
            .await
    }

    async fn get_tenancy(&self, tenancy_id: &str) -> Result<Tenancy> {
        let path = format!("/tenancies/{}", segment(tenancy_id));
        Ok(self.http.get(&path, &Query::new()).await?.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::tests::test_signer;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_list_compartments_requests_accessible_subtree() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/20160918/compartments"))
            .and(query_param("compartmentId", "ocid1.tenancy"))
            .and(query_param("compartmentIdInSubtree", "true"))
            .and(query_param("accessLevel", "ACCESSIBLE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "ocid1.compartment.a", "name": "dev", "lifecycleState": "ACTIVE", "isAccessible": true}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = IdentityClient::new(OciHttpClient::new(
            reqwest::Client::new(),
            test_signer(),
            format!("{}/20160918", server.uri()),
        ));
        let compartments = client.list_compartments("ocid1.tenancy").await.unwrap();
        assert_eq!(compartments.len(), 1);
        assert_eq!(compartments[0].name, "dev");
        assert_eq!(compartments[0].is_accessible, Some(true));
    }

    #[test]
    fn test_tenancy_deserializes() {
        let tenancy: Tenancy = serde_json::from_value(json!({
            "id": "ocid1.tenancy",
            "name": "acme",
            "homeRegionKey": "IAD"
        }))
        .unwrap();
        assert_eq!(tenancy.home_region_key.as_deref(), Some("IAD"));
    }
}
