//! A skill: a named group of tools plus the prompts that go with them

use crate::tools::Tool;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Prompt text with `{{variable}}` placeholders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub name: String,
    pub template: String,
    pub description: Option<String>,
}

impl PromptTemplate {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Substitute known variables in one pass. Placeholders without a value
    /// are left as written.
    pub fn render(&self, variables: &HashMap<String, String>) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let key = after[..end].trim();
                    match variables.get(key) {
                        Some(value) => out.push_str(value),
                        None => out.push_str(&rest[start..start + 2 + end + 2]),
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

#[derive(Clone)]
pub struct Skill {
    name: String,
    description: String,
    tools: Vec<Arc<dyn Tool>>,
    prompts: Vec<PromptTemplate>,
}

impl std::fmt::Debug for Skill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Skill")
            .field("name", &self.name)
            .field("tools", &self.tool_names())
            .field("prompts", &self.prompts.len())
            .finish()
    }
}

impl Skill {
    pub fn builder(name: impl Into<String>, description: impl Into<String>) -> SkillBuilder {
        SkillBuilder {
            skill: Skill {
                name: name.into(),
                description: description.into(),
                tools: Vec::new(),
                prompts: Vec::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn get_tool(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn prompts(&self) -> &[PromptTemplate] {
        &self.prompts
    }

    pub fn get_prompt(&self, name: &str) -> Option<&PromptTemplate> {
        self.prompts.iter().find(|p| p.name == name)
    }
}

pub struct SkillBuilder {
    skill: Skill,
}

impl SkillBuilder {
    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.skill.tools.push(tool);
        self
    }

    pub fn tools(mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        self.skill.tools.extend(tools);
        self
    }

    /// A later prompt with the same name replaces the earlier one
    pub fn prompt(mut self, prompt: PromptTemplate) -> Self {
        self.skill.prompts.retain(|p| p.name != prompt.name);
        self.skill.prompts.push(prompt);
        self
    }

    pub fn build(self) -> Skill {
        self.skill
    }
}
