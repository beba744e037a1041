//! Tool system for the MCP server
//!
//! - Deny-by-default capability enforcement
//! - Structured result envelopes with provenance
//! - Registry with policy-filtered MCP listing

mod capability;
mod registry;
mod result;
mod tool;

pub use capability::{Capability, CapabilityPolicy, CapabilitySet};
pub use registry::{McpToolInfo, RegistryError, ToolRegistry, ToolSummary};
pub use result::{
    ToolError, ToolErrorKind, ToolOutcome, ToolProvenance, ToolResultEnvelope, ValidationError,
};
pub use tool::{
    HandlerTool, Tool, ToolExecutionContext, ToolHandler, ToolMetadata, ToolSchema, args_hash,
};
