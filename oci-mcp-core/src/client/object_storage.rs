//! Object storage client

use super::transport::{OciHttpClient, Query, segment};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bucket summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketSummary {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub compartment_id: Option<String>,
    #[serde(default)]
    pub time_created: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait ObjectStorageApi: Send + Sync {
    /// Object storage namespace of the tenancy
    async fn get_namespace(&self) -> Result<String>;

    async fn list_buckets(&self, namespace: &str, compartment_id: &str)
    -> Result<Vec<BucketSummary>>;
}

/// REST client for object storage
#[derive(Debug, Clone)]
pub struct ObjectStorageClient {
    http: OciHttpClient,
}

impl ObjectStorageClient {
    pub fn new(http: OciHttpClient) -> Self {
        Self { http }
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }
}

#[async_trait]
impl ObjectStorageApi for ObjectStorageClient {
    async fn get_namespace(&self) -> Result<String> {
        // The body is a bare JSON string
        Ok(self.http.get("/n/", &Query::new()).await?.data)
    }

    async fn list_buckets(
        &self,
        namespace: &str,
        compartment_id: &str,
    ) -> Result<Vec<BucketSummary>> {
        let path = format!("/n/{}/b", segment(namespace));
        self.http
            .list_all(&path, &vec![("compartmentId", compartment_id.to_string())])
            .await
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
    async fn test_namespace_then_buckets() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/n/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!("acme-ns")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/n/acme-ns/b"))
            .and(query_param("compartmentId", "ocid1.c"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "logs", "namespace": "acme-ns", "timeCreated": "2023-05-01T00:00:00Z"}
            ])))
            .mount(&server)
            .await;

        let client = ObjectStorageClient::new(OciHttpClient::new(
            reqwest::Client::new(),
            test_signer(),
            server.uri(),
        ));
        let namespace = client.get_namespace().await.unwrap();
        assert_eq!(namespace, "acme-ns");

        let buckets = client.list_buckets(&namespace, "ocid1.c").await.unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].name, "logs");
        assert!(buckets[0].time_created.is_some());
    }
}
