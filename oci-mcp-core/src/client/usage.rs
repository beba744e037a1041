//! Usage (cost) API client

#[cfg(feature = "usage-api")]
use super::transport::{OciHttpClient, Query};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Body of a summarized usage request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSummarizedUsagesDetails {
    pub tenant_id: String,
    #[serde(serialize_with = "millis")]
    pub time_usage_started: DateTime<Utc>,
    #[serde(serialize_with = "millis")]
    pub time_usage_ended: DateTime<Utc>,
    pub granularity: String,
    pub query_type: String,
    pub group_by: Vec<String>,
    pub is_forecast: bool,
}

impl RequestSummarizedUsagesDetails {
    /// Cost query grouped by service, no forecast
    pub fn cost_by_service(
        tenant_id: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            time_usage_started: start,
            time_usage_ended: end,
            granularity: granularity.into(),
            query_type: "COST".to_string(),
            group_by: vec!["service".to_string()],
            is_forecast: false,
        }
    }
}

fn millis<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Summarized usage response; rows stay raw JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageAggregation {
    #[serde(default)]
    pub items: Vec<Value>,
}

#[async_trait]
pub trait UsageApi: Send + Sync {
    async fn request_summarized_usages(
        &self,
        details: &RequestSummarizedUsagesDetails,
    ) -> Result<UsageAggregation>;
}

/// REST client for the usage API
#[cfg(feature = "usage-api")]
#[derive(Debug, Clone)]
pub struct UsageClient {
    http: OciHttpClient,
}

#[cfg(feature = "usage-api")]
impl UsageClient {
    pub fn new(http: OciHttpClient) -> Self {
        Self { http }
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }
}

#[cfg(feature = "usage-api")]
#[async_trait]
impl UsageApi for UsageClient {
    async fn request_summarized_usages(
        &self,
        details: &RequestSummarizedUsagesDetails,
    ) -> Result<UsageAggregation> {
        Ok(self.http.post("/usage", &Query::new(), details).await?.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::tests::test_signer;
    use chrono::TimeZone;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[cfg(feature = "usage-api")]
    #[tokio::test]
    async fn test_request_body_shape() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap();
        let details = RequestSummarizedUsagesDetails::cost_by_service("ocid1.tenancy", start, end, "DAILY");

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/20200107/usage"))
            .and(body_json(json!({
                "tenantId": "ocid1.tenancy",
                "timeUsageStarted": "2024-01-01T00:00:00.000Z",
                "timeUsageEnded": "2024-01-08T00:00:00.000Z",
                "granularity": "DAILY",
                "queryType": "COST",
                "groupBy": ["service"],
                "isForecast": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"service": "Compute", "computedAmount": 1.5}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = UsageClient::new(OciHttpClient::new(
            reqwest::Client::new(),
            test_signer(),
            format!("{}/20200107", server.uri()),
        ));
        let aggregation = client.request_summarized_usages(&details).await.unwrap();
        assert_eq!(aggregation.items.len(), 1);
        assert_eq!(aggregation.items[0]["computedAmount"], 1.5);
    }
}
