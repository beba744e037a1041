//! Autonomous database listing

use super::{resolve_compartment, snake_case_keys};
use crate::client::{AutonomousDatabase, CloudClients};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row of `list_autonomous_databases`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutonomousDatabaseSummary {
    pub id: String,
    pub db_name: Option<String>,
    pub display_name: Option<String>,
    pub lifecycle_state: Option<String>,
    pub db_workload: Option<String>,
    pub cpu_core_count: Option<i64>,
    pub data_storage_size_in_tbs: Option<i64>,
    pub is_auto_scaling_enabled: Option<bool>,
    pub connection_strings: Value,
}

impl From<AutonomousDatabase> for AutonomousDatabaseSummary {
    fn from(adb: AutonomousDatabase) -> Self {
        Self {
            id: adb.id,
            db_name: adb.db_name,
            display_name: adb.display_name,
            lifecycle_state: adb.lifecycle_state,
            db_workload: adb.db_workload,
            cpu_core_count: adb.cpu_core_count,
            data_storage_size_in_tbs: adb.data_storage_size_in_tbs,
            is_auto_scaling_enabled: adb.is_auto_scaling_enabled,
            connection_strings: adb
                .connection_strings
                .map(snake_case_keys)
                .unwrap_or_else(|| Value::Object(Default::default())),
        }
    }
}

pub async fn list_autonomous_databases(
    clients: &dyn CloudClients,
    compartment_ocid: Option<&str>,
) -> Result<Vec<AutonomousDatabaseSummary>> {
    let compartment = resolve_compartment(clients, compartment_ocid)?;
    let database = clients.database()?;

    Ok(database
        .list_autonomous_databases(&compartment)
        .await?
        .into_iter()
        .map(AutonomousDatabaseSummary::from)
        .collect())
}
