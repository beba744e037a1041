//! MCP Server Implementation
//!
//! The main server that handles MCP requests and dispatches to tools,
//! resources and prompts.

use super::protocol::*;
use super::resources::{CompartmentsResource, ResourceProvider};
use super::transport::{Inbound, Transport};
use crate::client::CloudClients;
use crate::config::ServerConfig;
use crate::skills::{PromptTemplate, Skill, create_oci_skill};
use crate::tools::{
    CapabilityPolicy, RegistryError, Tool, ToolError, ToolExecutionContext, ToolRegistry,
    ToolOutcome, ToolResultEnvelope,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// MCP Server configuration
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    pub name: String,
    pub version: String,
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self {
            name: ServerConfig::default().name,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

pub struct McpServer {
    config: McpServerConfig,
    tools: ToolRegistry,
    resources: Vec<Box<dyn ResourceProvider>>,
    prompts: BTreeMap<String, PromptTemplate>,
    policy: Option<CapabilityPolicy>,
    initialized: AtomicBool,
}

impl std::fmt::Debug for McpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpServer")
            .field("config", &self.config)
            .field("tools", &self.tools)
            .field("prompts", &self.prompts.keys().collect::<Vec<_>>())
            .field("initialized", &self.initialized)
            .finish()
    }
}

fn to_result<T: Serialize>(id: RequestId, value: T) -> JsonRpcResponse {
    match serde_json::to_value(value) {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal(e.to_string())),
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(
    params: Option<Value>,
    what: &str,
) -> Result<T, JsonRpcError> {
    let params = params
        .ok_or_else(|| JsonRpcError::invalid_params(format!("Missing {} params", what)))?;
    serde_json::from_value(params)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid {} params: {}", what, e)))
}

impl McpServer {
    pub fn builder() -> McpServerBuilder {
        McpServerBuilder::new()
    }

    /// The OCI server: every cloud tool, the compartments resource and the
    /// analysis prompt, with writes gated by `allow_mutations`
    pub fn from_config(
        config: &ServerConfig,
        clients: Arc<dyn CloudClients>,
    ) -> Result<Self, RegistryError> {
        let skill = create_oci_skill(Arc::clone(&clients));
        Ok(McpServer::builder()
            .name(config.name.clone())
            .with_skill(&skill)?
            .with_resource_provider(Box::new(CompartmentsResource::new(clients)))
            .with_policy(CapabilityPolicy::for_mutations(config.allow_mutations))
            .build())
    }

    pub fn config(&self) -> &McpServerConfig {
        &self.config
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Handle one message. Notifications return `None`.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            debug!(method = %request.method, "Notification");
            if request.method == "notifications/initialized" {
                self.initialized.store(true, Ordering::SeqCst);
            }
            return None;
        }

        let id = request.id.clone().unwrap_or(RequestId::Null);
        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "initialized" => JsonRpcResponse::success(id, Value::Null),
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            "resources/list" => self.handle_resources_list(id).await,
            "resources/read" => self.handle_resources_read(id, request.params).await,
            "prompts/list" => self.handle_prompts_list(id),
            "prompts/get" => self.handle_prompts_get(id, request.params),
            other => JsonRpcResponse::error(id, JsonRpcError::method_not_found(other)),
        };
        Some(response)
    }

    fn handle_initialize(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: InitializeParams = match parse_params(params, "initialize") {
            Ok(params) => params,
            Err(e) => return JsonRpcResponse::error(id, e),
        };

        info!(
            client = %params.client_info.name,
            client_version = %params.client_info.version,
            protocol_version = %params.protocol_version,
            "Client connected"
        );

        let result = InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities::default(),
            server_info: Implementation {
                name: self.config.name.clone(),
                version: self.config.version.clone(),
            },
        };

        self.initialized.store(true, Ordering::SeqCst);
        to_result(id, result)
    }

    fn handle_tools_list(&self, id: RequestId) -> JsonRpcResponse {
        let tools = self.tools.listing(self.policy.as_ref());
        to_result(id, ListToolsResult { tools })
    }

    async fn handle_tools_call(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match parse_params(params, "tool call") {
            Ok(params) => params,
            Err(e) => return JsonRpcResponse::error(id, e),
        };

        let Some(tool) = self.tools.get(&params.name) else {
            return JsonRpcResponse::error(id, JsonRpcError::not_found("Tool", &params.name));
        };

        if let Some(policy) = &self.policy {
            if let Err(denied) = policy.check_all(&tool.required_capabilities()) {
                let error = ToolError::capability_denied(tool.name(), &denied.sorted());
                warn!(tool = %params.name, "Tool refused by policy");
                return JsonRpcResponse::error(id, JsonRpcError::new(NOT_PERMITTED, error.message));
            }
        }

        let result = self
            .call_tool(tool.as_ref(), params.arguments, id.to_string())
            .await;
        to_result(id, result)
    }

    async fn call_tool(&self, tool: &dyn Tool, arguments: Value, request_id: String) -> CallToolResult {
        if let Err(errors) = tool.validate(&arguments) {
            return CallToolResult::failure(&ToolError::validation(errors).message);
        }

        let ctx = ToolExecutionContext::new().with_request_id(request_id);
        match tool.execute(arguments, &ctx).await {
            Ok(envelope) => {
                log_envelope(&envelope);
                match envelope.outcome {
                    ToolOutcome::Success { value } => match serde_json::to_string_pretty(&value) {
                        Ok(text) => CallToolResult::text(text),
                        Err(e) => CallToolResult::failure(&e.to_string()),
                    },
                    ToolOutcome::Error { error } => {
                        CallToolResult::failure(&error.caller_message())
                    }
                }
            }
            Err(error) => CallToolResult::failure(&error.caller_message()),
        }
    }

    async fn handle_resources_list(&self, id: RequestId) -> JsonRpcResponse {
        let mut resources = Vec::new();
        for provider in &self.resources {
            resources.extend(provider.list_resources().await);
        }
        to_result(id, ListResourcesResult { resources })
    }

    async fn handle_resources_read(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: ReadResourceParams = match parse_params(params, "resource read") {
            Ok(params) => params,
            Err(e) => return JsonRpcResponse::error(id, e),
        };

        for provider in &self.resources {
            match provider.read_resource(&params.uri).await {
                Ok(Some(content)) => {
                    return to_result(
                        id,
                        ReadResourceResult {
                            contents: vec![content],
                        },
                    );
                }
                Ok(None) => continue,
                Err(e) => {
                    warn!(uri = %params.uri, error = %e, "Resource read failed");
                    return JsonRpcResponse::error(id, JsonRpcError::internal(e.to_string()));
                }
            }
        }

        JsonRpcResponse::error(id, JsonRpcError::not_found("Resource", &params.uri))
    }

    fn handle_prompts_list(&self, id: RequestId) -> JsonRpcResponse {
        let prompts = self
            .prompts
            .values()
            .map(|p| Prompt {
                name: p.name.clone(),
                description: p.description.clone(),
            })
            .collect();

        to_result(id, ListPromptsResult { prompts })
    }

    fn handle_prompts_get(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: GetPromptParams = match parse_params(params, "prompt get") {
            Ok(params) => params,
            Err(e) => return JsonRpcResponse::error(id, e),
        };

        let Some(prompt) = self.prompts.get(&params.name) else {
            return JsonRpcResponse::error(id, JsonRpcError::not_found("Prompt", &params.name));
        };

        let variables: HashMap<String, String> = params
            .arguments
            .into_iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
            .collect();

        let result = GetPromptResult {
            description: prompt.description.clone(),
            messages: vec![PromptMessage {
                role: Role::User,
                content: Content::text(prompt.render(&variables)),
            }],
        };
        to_result(id, result)
    }

    /// Serve until the transport reaches end of input
    pub async fn run<T: Transport>(&self, mut transport: T) -> crate::error::Result<()> {
        for summary in self.tools.summaries() {
            let permitted = self.tools.get(&summary.name).is_some_and(|tool| {
                self.policy
                    .as_ref()
                    .is_none_or(|p| p.check_all(&tool.required_capabilities()).is_ok())
            });
            debug!(
                tool = %summary.name,
                tags = ?summary.tags,
                returns = summary.returns.as_deref().unwrap_or("-"),
                capabilities = ?summary.required_capabilities,
                permitted,
                "Registered tool"
            );
        }
        info!(tools = self.tools.len(), "MCP server ready");
        while let Some(inbound) = transport.receive().await? {
            let response = match inbound {
                Inbound::Message(request) => self.handle_request(request).await,
                Inbound::Malformed(reason) => {
                    warn!(%reason, "Unparseable message");
                    Some(JsonRpcResponse::parse_error())
                }
            };
            if let Some(response) = response {
                transport.send(&response).await?;
            }
        }
        info!("Input closed, shutting down");
        Ok(())
    }
}

fn log_envelope(envelope: &ToolResultEnvelope) {
    let provenance = &envelope.provenance;
    match envelope.error() {
        None => info!(
            tool = %provenance.tool_name,
            args_hash = %provenance.args_hash,
            duration_ms = provenance.duration_ms,
            "Tool call succeeded"
        ),
        Some(error) => warn!(
            tool = %provenance.tool_name,
            args_hash = %provenance.args_hash,
            kind = error.kind.as_str(),
            code = error.code.as_deref().unwrap_or(""),
            "Tool call failed: {}",
            error.message
        ),
    }
}

/// Builder for MCP Server
pub struct McpServerBuilder {
    config: McpServerConfig,
    tools: ToolRegistry,
    resources: Vec<Box<dyn ResourceProvider>>,
    prompts: BTreeMap<String, PromptTemplate>,
    policy: Option<CapabilityPolicy>,
}

impl McpServerBuilder {
    pub fn new() -> Self {
        Self {
            config: McpServerConfig::default(),
            tools: ToolRegistry::new(),
            resources: Vec::new(),
            prompts: BTreeMap::new(),
            policy: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.config.version = version.into();
        self
    }

    pub fn with_tools(mut self, registry: ToolRegistry) -> Self {
        self.tools = registry;
        self
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Result<Self, RegistryError> {
        self.tools.register(tool)?;
        Ok(self)
    }

    pub fn with_resource_provider(mut self, provider: Box<dyn ResourceProvider>) -> Self {
        self.resources.push(provider);
        self
    }

    pub fn with_prompt(mut self, prompt: PromptTemplate) -> Self {
        self.prompts.insert(prompt.name.clone(), prompt);
        self
    }

    /// Register a skill's tools and prompts
    pub fn with_skill(mut self, skill: &Skill) -> Result<Self, RegistryError> {
        self.tools.register_all(skill.tools().iter().cloned())?;
        for prompt in skill.prompts() {
            self.prompts.insert(prompt.name.clone(), prompt.clone());
        }
        Ok(self)
    }

    pub fn with_policy(mut self, policy: CapabilityPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn build(self) -> McpServer {
        McpServer {
            config: self.config,
            tools: self.tools,
            resources: self.resources,
            prompts: self.prompts,
            policy: self.policy,
            initialized: AtomicBool::new(false),
        }
    }
}

impl Default for McpServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
