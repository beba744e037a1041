//! The `Tool` trait, its metadata and argument schema

use super::capability::CapabilitySet;
use super::result::{ToolError, ToolProvenance, ToolResultEnvelope, ValidationError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use sha2::{Digest, Sha256};

/// Name, description and listing hints for a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMetadata {
    pub name: String,
    pub description: String,
    /// Shape of the success value, for logs and docs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ToolMetadata {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            returns: None,
            tags: Vec::new(),
        }
    }

    pub fn with_returns(mut self, returns: impl Into<String>) -> Self {
        self.returns = Some(returns.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

/// JSON Schema (object form) describing a tool's arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolSchema {
    pub parameters: Value,
}

impl ToolSchema {
    pub fn new(parameters: Value) -> Self {
        Self { parameters }
    }

    /// No arguments
    pub fn empty() -> Self {
        Self::new(json!({ "type": "object", "properties": {} }))
    }

    pub fn required(&self) -> Vec<&str> {
        self.parameters["required"]
            .as_array()
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    fn declared_type(&self, property: &str) -> Option<&str> {
        self.parameters["properties"][property]["type"].as_str()
    }

    /// Missing required arguments, then string-typed arguments holding
    /// something else. `null` stands for "no arguments".
    pub fn check(&self, args: &Value) -> Result<(), Vec<ValidationError>> {
        let empty = Map::new();
        let object = match args {
            Value::Object(map) => map,
            Value::Null => &empty,
            _ => return Err(vec![ValidationError::new("arguments", "must be a JSON object")]),
        };

        let missing = self
            .required()
            .into_iter()
            .filter(|name| object.get(*name).is_none_or(Value::is_null))
            .map(|name| ValidationError::new(name, "is required"));

        let mistyped = object
            .iter()
            .filter(|(name, value)| {
                self.declared_type(name) == Some("string")
                    && !value.is_null()
                    && !value.is_string()
            })
            .map(|(name, _)| ValidationError::new(name.as_str(), "must be a string"));

        let errors: Vec<ValidationError> = missing.chain(mistyped).collect();
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Per-call context passed to tools
#[derive(Debug, Clone, Default)]
pub struct ToolExecutionContext {
    /// JSON-RPC id of the `tools/call` request
    pub request_id: Option<String>,
}

impl ToolExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// A callable tool.
///
/// The server checks capabilities and calls `validate` before `execute`.
/// Domain failures belong in the envelope; `Err` is for failures of the tool
/// machinery itself.
#[async_trait]
pub trait Tool: Send + Sync {
    fn metadata(&self) -> &ToolMetadata;

    fn name(&self) -> &str {
        &self.metadata().name
    }

    fn description(&self) -> &str {
        &self.metadata().description
    }

    fn schema(&self) -> &ToolSchema;

    fn required_capabilities(&self) -> CapabilitySet {
        CapabilitySet::new()
    }

    fn validate(&self, args: &Value) -> Result<(), Vec<ValidationError>> {
        self.schema().check(args)
    }

    async fn execute(
        &self,
        args: Value,
        ctx: &ToolExecutionContext,
    ) -> Result<ToolResultEnvelope, ToolError>;
}

/// The body of a tool: arguments in, JSON value out
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(&self, args: Value, ctx: &ToolExecutionContext) -> Result<Value, ToolError>;
}

/// A [`Tool`] built from metadata, a schema and a [`ToolHandler`]
pub struct HandlerTool<H> {
    metadata: ToolMetadata,
    schema: ToolSchema,
    capabilities: CapabilitySet,
    handler: H,
}

impl<H: ToolHandler> HandlerTool<H> {
    pub fn new(metadata: ToolMetadata, schema: ToolSchema, handler: H) -> Self {
        Self {
            metadata,
            schema,
            capabilities: CapabilitySet::new(),
            handler,
        }
    }

    pub fn with_capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = capabilities;
        self
    }
}

#[async_trait]
impl<H: ToolHandler + 'static> Tool for HandlerTool<H> {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    fn required_capabilities(&self) -> CapabilitySet {
        self.capabilities.clone()
    }

    async fn execute(
        &self,
        args: Value,
        ctx: &ToolExecutionContext,
    ) -> Result<ToolResultEnvelope, ToolError> {
        let provenance = ToolProvenance::start(&self.metadata.name, &args)
            .with_request_id(ctx.request_id.as_deref());
        let result = self.handler.handle(args, ctx).await;
        Ok(ToolResultEnvelope::from_result(result, provenance.finish()))
    }
}

/// First 16 hex chars of the SHA-256 of the serialized arguments
pub fn args_hash(args: &Value) -> String {
    let digest = Sha256::digest(args.to_string().as_bytes());
    digest[..8].iter().map(|b| format!("{:02x}", b)).collect()
}
