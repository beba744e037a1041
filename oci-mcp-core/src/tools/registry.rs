//! Tool registry for registration, lookup and MCP listing

use super::capability::CapabilityPolicy;
use super::tool::Tool;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),
}

/// One line per tool for startup logs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSummary {
    pub name: String,
    pub returns: Option<String>,
    pub tags: Vec<String>,
    pub required_capabilities: Vec<String>,
}

/// Tool information for MCP listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpToolInfo {
    pub name: String,
    pub description: String,
    /// JSON Schema for input parameters
    pub input_schema: serde_json::Value,
}

impl From<&dyn Tool> for McpToolInfo {
    fn from(tool: &dyn Tool) -> Self {
        Self {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            input_schema: tool.schema().parameters.clone(),
        }
    }
}

/// Tools kept in registration order, so `tools/list` is stable across calls
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    by_name: HashMap<String, usize>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if self.by_name.contains_key(&name) {
            return Err(RegistryError::DuplicateTool(name));
        }
        self.by_name.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Stops at the first duplicate; tools before it stay registered
    pub fn register_all(
        &mut self,
        tools: impl IntoIterator<Item = Arc<dyn Tool>>,
    ) -> Result<(), RegistryError> {
        tools.into_iter().try_for_each(|tool| self.register(tool))
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.by_name.get(name).map(|&i| &self.tools[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tools the policy permits; every tool when there is no policy
    pub fn permitted<'a>(
        &'a self,
        policy: Option<&'a CapabilityPolicy>,
    ) -> impl Iterator<Item = &'a Arc<dyn Tool>> + 'a {
        self.tools.iter().filter(move |tool| {
            policy.is_none_or(|p| p.check_all(&tool.required_capabilities()).is_ok())
        })
    }

    /// `tools/list` payload
    pub fn listing(&self, policy: Option<&CapabilityPolicy>) -> Vec<McpToolInfo> {
        self.permitted(policy)
            .map(|tool| McpToolInfo::from(tool.as_ref()))
            .collect()
    }

    pub fn summaries(&self) -> Vec<ToolSummary> {
        self.tools
            .iter()
            .map(|tool| ToolSummary {
                name: tool.name().to_string(),
                returns: tool.metadata().returns.clone(),
                tags: tool.metadata().tags.clone(),
                required_capabilities: tool
                    .required_capabilities()
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
            })
            .collect()
    }
}
