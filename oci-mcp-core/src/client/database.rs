//! Database service client

use super::transport::OciHttpClient;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Autonomous database summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutonomousDatabase {
    pub id: String,
    #[serde(default)]
    pub db_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub lifecycle_state: Option<String>,
    #[serde(default)]
    pub db_workload: Option<String>,
    #[serde(default)]
    pub cpu_core_count: Option<i64>,
    #[serde(default, rename = "dataStorageSizeInTBs")]
    pub data_storage_size_in_tbs: Option<i64>,
    #[serde(default)]
    pub is_auto_scaling_enabled: Option<bool>,
    /// Kept as raw JSON; the tool layer reshapes it
    #[serde(default)]
    pub connection_strings: Option<Value>,
}

#[async_trait]
pub trait DatabaseApi: Send + Sync {
    async fn list_autonomous_databases(&self, compartment_id: &str)
    -> Result<Vec<AutonomousDatabase>>;
}

/// REST client for the database service
#[derive(Debug, Clone)]
pub struct DatabaseClient {
    http: OciHttpClient,
}

impl DatabaseClient {
    pub fn new(http: OciHttpClient) -> Self {
        Self { http }
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }
}

#[async_trait]
impl DatabaseApi for DatabaseClient {
    async fn list_autonomous_databases(
        &self,
        compartment_id: &str,
    ) -> Result<Vec<AutonomousDatabase>> {
        self.http
            .list_all(
                "/autonomousDatabases",
                &vec![("compartmentId", compartment_id.to_string())],
            )
            .await
    }
}
