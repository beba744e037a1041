//! The OCI inventory skill: eight tools over [`crate::ops`] plus the analysis
//! prompt

use super::skill::{PromptTemplate, Skill};
use crate::client::CloudClients;
use crate::ops;
use crate::tools::{
    Capability, CapabilitySet, HandlerTool, Tool, ToolError, ToolExecutionContext, ToolHandler,
    ToolMetadata, ToolSchema,
};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

pub const SKILL_NAME: &str = "oci";

pub const ANALYSIS_PROMPT_NAME: &str = "oci_analysis_prompt";

pub const ANALYSIS_PROMPT: &str = "You are an expert Oracle Cloud architect. Given the JSON outputs from tools like \
`list_compute_instances`, `perform_security_assessment`, and `get_tenancy_cost_summary`, \
produce a concise assessment covering security, cost, and reliability. \
Highlight risky public exposure, suggest least-privilege hardening, recommend cost optimizations \
(stop idle instances, enable ADB auto-scaling), and note any missing monitoring/alerts.";

/// Operation behind each tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudOperation {
    ListComputeInstances,
    GetInstanceDetails,
    InstanceAction,
    ListAutonomousDatabases,
    ListStorageBuckets,
    ListCompartments,
    PerformSecurityAssessment,
    GetTenancyCostSummary,
}

impl CloudOperation {
    pub const ALL: [CloudOperation; 8] = [
        CloudOperation::ListComputeInstances,
        CloudOperation::GetInstanceDetails,
        CloudOperation::InstanceAction,
        CloudOperation::ListAutonomousDatabases,
        CloudOperation::ListStorageBuckets,
        CloudOperation::ListCompartments,
        CloudOperation::PerformSecurityAssessment,
        CloudOperation::GetTenancyCostSummary,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CloudOperation::ListComputeInstances => "list_compute_instances",
            CloudOperation::GetInstanceDetails => "get_instance_details",
            CloudOperation::InstanceAction => "instance_action",
            CloudOperation::ListAutonomousDatabases => "list_autonomous_databases",
            CloudOperation::ListStorageBuckets => "list_storage_buckets",
            CloudOperation::ListCompartments => "list_compartments",
            CloudOperation::PerformSecurityAssessment => "perform_security_assessment",
            CloudOperation::GetTenancyCostSummary => "get_tenancy_cost_summary",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            CloudOperation::ListComputeInstances => {
                "List Compute instances in a compartment (defaults to tenancy), optionally filtered by lifecycle state (e.g. RUNNING, STOPPED)."
            }
            CloudOperation::GetInstanceDetails => {
                "Get detailed info for a Compute instance, including VNICs and public IPs."
            }
            CloudOperation::InstanceAction => {
                "Perform a safe instance action (START, STOP, RESET, SOFTRESET, SOFTSTOP)."
            }
            CloudOperation::ListAutonomousDatabases => {
                "List Autonomous Databases in a compartment (defaults to tenancy)."
            }
            CloudOperation::ListStorageBuckets => {
                "List Object Storage buckets in the configured region for the given compartment."
            }
            CloudOperation::ListCompartments => {
                "List accessible compartments in the tenancy (including subtrees)."
            }
            CloudOperation::PerformSecurityAssessment => {
                "Basic security posture checks (public IPs, wide-open rules). Read-only heuristics."
            }
            CloudOperation::GetTenancyCostSummary => {
                "Summarize tenancy costs using the Usage API (requires permissions)."
            }
        }
    }

    fn returns(&self) -> &'static str {
        match self {
            CloudOperation::ListComputeInstances => "Array of instance summaries",
            CloudOperation::GetInstanceDetails => "Instance fields plus a `vnics` array",
            CloudOperation::InstanceAction => "HTTP status and response headers of the action call",
            CloudOperation::ListAutonomousDatabases => "Array of autonomous database summaries",
            CloudOperation::ListStorageBuckets => "Array of {name, created, namespace}",
            CloudOperation::ListCompartments => "Array of {id, name, lifecycle_state, is_accessible}",
            CloudOperation::PerformSecurityAssessment => {
                "public_instances, wide_open_nsg_rules and wide_open_sec_list_rules"
            }
            CloudOperation::GetTenancyCostSummary => {
                "start, end, granularity, total_computed_amount and per-service items"
            }
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            CloudOperation::ListComputeInstances
            | CloudOperation::GetInstanceDetails
            | CloudOperation::InstanceAction => "compute",
            CloudOperation::ListAutonomousDatabases => "database",
            CloudOperation::ListStorageBuckets => "object_storage",
            CloudOperation::ListCompartments => "identity",
            CloudOperation::PerformSecurityAssessment => "security",
            CloudOperation::GetTenancyCostSummary => "cost",
        }
    }

    fn schema(&self) -> ToolSchema {
        let compartment = json!({
            "type": "string",
            "description": "Compartment OCID (defaults to DEFAULT_COMPARTMENT_OCID, then the tenancy)"
        });

        let parameters = match self {
            CloudOperation::ListComputeInstances => json!({
                "type": "object",
                "properties": {
                    "compartment_ocid": compartment,
                    "lifecycle_state": {
                        "type": "string",
                        "description": "Exact lifecycle state to keep, e.g. RUNNING or STOPPED"
                    }
                }
            }),
            CloudOperation::GetInstanceDetails => json!({
                "type": "object",
                "properties": {
                    "instance_id": { "type": "string", "description": "The OCID of the instance" }
                },
                "required": ["instance_id"]
            }),
            CloudOperation::InstanceAction => json!({
                "type": "object",
                "properties": {
                    "instance_id": { "type": "string", "description": "Instance OCID" },
                    "action": {
                        "type": "string",
                        "description": "One of START, STOP, RESET, SOFTRESET, SOFTSTOP (case-insensitive)"
                    }
                },
                "required": ["instance_id", "action"]
            }),
            CloudOperation::ListAutonomousDatabases
            | CloudOperation::ListStorageBuckets
            | CloudOperation::PerformSecurityAssessment => json!({
                "type": "object",
                "properties": { "compartment_ocid": compartment }
            }),
            CloudOperation::ListCompartments => return ToolSchema::empty(),
            CloudOperation::GetTenancyCostSummary => json!({
                "type": "object",
                "properties": {
                    "start_time_iso": {
                        "type": "string",
                        "description": "ISO 8601 start (defaults to end minus 7 days)"
                    },
                    "end_time_iso": {
                        "type": "string",
                        "description": "ISO 8601 end (defaults to now)"
                    },
                    "granularity": {
                        "type": "string",
                        "description": "DAILY or MONTHLY",
                        "default": ops::cost::DEFAULT_GRANULARITY
                    }
                }
            }),
        };
        ToolSchema::new(parameters)
    }

    fn capabilities(&self) -> CapabilitySet {
        match self {
            CloudOperation::InstanceAction => {
                CapabilitySet::from_capabilities([Capability::CloudRead, Capability::CloudWrite])
            }
            _ => CapabilitySet::from_capabilities([Capability::CloudRead]),
        }
    }
}

/// Runs one [`CloudOperation`] against the shared clients
pub struct CloudToolHandler {
    clients: Arc<dyn CloudClients>,
    operation: CloudOperation,
}

impl CloudToolHandler {
    pub fn new(clients: Arc<dyn CloudClients>, operation: CloudOperation) -> Self {
        Self { clients, operation }
    }
}

fn optional_str<'a>(args: &'a Value, name: &str) -> Option<&'a str> {
    args.get(name).and_then(Value::as_str)
}

fn required_str<'a>(args: &'a Value, name: &str) -> Result<&'a str, ToolError> {
    optional_str(args, name).ok_or_else(|| {
        ToolError::validation(vec![crate::tools::ValidationError::new(name, "is required")])
    })
}

fn to_json<T: Serialize>(value: T) -> Result<Value, ToolError> {
    serde_json::to_value(value).map_err(|e| ToolError::internal(e.to_string()))
}

#[async_trait]
impl ToolHandler for CloudToolHandler {
    async fn handle(&self, args: Value, _ctx: &ToolExecutionContext) -> Result<Value, ToolError> {
        let clients = self.clients.as_ref();
        let compartment = optional_str(&args, "compartment_ocid");
        debug!(tool = self.operation.name(), "Running cloud operation");

        match self.operation {
            CloudOperation::ListComputeInstances => to_json(
                ops::list_compute_instances(
                    clients,
                    compartment,
                    optional_str(&args, "lifecycle_state"),
                )
                .await?,
            ),
            CloudOperation::GetInstanceDetails => {
                let instance_id = required_str(&args, "instance_id")?;
                to_json(ops::get_instance_details(clients, instance_id).await?)
            }
            CloudOperation::InstanceAction => {
                let instance_id = required_str(&args, "instance_id")?;
                let action = required_str(&args, "action")?;
                to_json(ops::instance_action(clients, instance_id, action).await?)
            }
            CloudOperation::ListAutonomousDatabases => {
                to_json(ops::list_autonomous_databases(clients, compartment).await?)
            }
            CloudOperation::ListStorageBuckets => {
                to_json(ops::list_storage_buckets(clients, compartment).await?)
            }
            CloudOperation::ListCompartments => to_json(ops::list_compartments(clients).await?),
            CloudOperation::PerformSecurityAssessment => {
                to_json(ops::perform_security_assessment(clients, compartment).await?)
            }
            CloudOperation::GetTenancyCostSummary => to_json(
                ops::get_tenancy_cost_summary(
                    clients,
                    optional_str(&args, "start_time_iso"),
                    optional_str(&args, "end_time_iso"),
                    optional_str(&args, "granularity"),
                )
                .await?,
            ),
        }
    }
}

/// Build the tool for one operation
pub fn cloud_tool(clients: Arc<dyn CloudClients>, operation: CloudOperation) -> Arc<dyn Tool> {
    let metadata = ToolMetadata::new(operation.name(), operation.description())
        .with_returns(operation.returns())
        .with_tag(operation.tag());

    Arc::new(
        HandlerTool::new(
            metadata,
            operation.schema(),
            CloudToolHandler::new(clients, operation),
        )
        .with_capabilities(operation.capabilities()),
    )
}

pub fn analysis_prompt() -> PromptTemplate {
    PromptTemplate::new(ANALYSIS_PROMPT_NAME, ANALYSIS_PROMPT)
        .with_description("A helper prompt to analyze OCI state returned by the tools.")
}

/// All eight tools and the analysis prompt
pub fn create_oci_skill(clients: Arc<dyn CloudClients>) -> Skill {
    let tools = CloudOperation::ALL
        .into_iter()
        .map(|op| cloud_tool(Arc::clone(&clients), op));

    Skill::builder(SKILL_NAME, "Oracle Cloud Infrastructure inventory, actions and posture checks")
        .tools(tools)
        .prompt(analysis_prompt())
        .build()
}
