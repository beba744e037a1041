//! Cloud inventory operations
//!
//! Each operation takes a [`CloudClients`] source plus its parameters, issues
//! the needed list/get calls and reshapes the responses into plain
//! serializable records. The MCP tools in [`crate::skills::cloud`] are thin
//! wrappers around these functions.

pub mod compute;
pub mod cost;
pub mod database;
pub mod identity;
pub mod security;
pub mod storage;

#[cfg(test)]
pub(crate) mod fake;

use crate::client::CloudClients;
use crate::error::{OciMcpError, Result};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

pub use compute::{
    ALLOWED_ACTIONS, InstanceDetails, InstanceSummary, VnicDetails, get_instance_details,
    instance_action, list_compute_instances, normalize_action,
};
pub use cost::{CostSummary, CostWindow, get_tenancy_cost_summary, parse_timestamp, resolve_window};
pub use database::{AutonomousDatabaseSummary, list_autonomous_databases};
pub use identity::{CompartmentSummary, list_compartments};
pub use security::{
    PublicInstanceFinding, SecurityFindings, SecurityListFinding, NsgFinding,
    perform_security_assessment,
};
pub use storage::{BucketRecord, list_storage_buckets};

/// Source CIDR that marks a rule as open to the internet
pub const ANYWHERE_CIDR: &str = "0.0.0.0/0";

/// Scope for compartment-scoped operations: the argument, else the
/// configured default compartment, else the tenancy.
pub fn resolve_compartment(clients: &dyn CloudClients, requested: Option<&str>) -> Result<String> {
    requested
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .or_else(|| clients.default_compartment().filter(|c| !c.is_empty()))
        .or_else(|| Some(clients.tenancy_id()).filter(|t| !t.is_empty()))
        .ok_or_else(|| OciMcpError::invalid_argument("No compartment OCID available"))
}

/// RFC 3339 text for an optional timestamp
pub(crate) fn rfc3339(time: Option<DateTime<Utc>>) -> Option<String> {
    time.map(|t| t.to_rfc3339())
}

/// Convert `camelCase` object keys to `snake_case`, recursively.
///
/// Keys with no lower-case letters (`HIGH`, `LOW`) are map keys chosen by the
/// service rather than field names, and are kept as they are.
pub fn snake_case_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (to_snake_case(&k), snake_case_keys(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(snake_case_keys).collect()),
        other => other,
    }
}

fn to_snake_case(key: &str) -> String {
    if !key.chars().any(|c| c.is_ascii_lowercase()) {
        return key.to_string();
    }

    let mut out = String::with_capacity(key.len() + 4);
    let mut prev: Option<char> = None;
    let chars: Vec<char> = key.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let boundary = match prev {
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                // "TBs" in "sizeInTBs" -> "in_tbs", "URLPath" -> "url_path"
                Some(p) if p.is_ascii_uppercase() && next_lower && i + 2 < chars.len() => true,
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
        prev = Some(c);
    }

    out
}
