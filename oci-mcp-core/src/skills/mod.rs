//! Skills bundle related tools with their prompt templates
//!
//! The server exposes one skill, [`cloud::create_oci_skill`], whose tools and
//! prompts become the MCP `tools/*` and `prompts/*` surface.
//!
//! ```rust,ignore
//! let clients: Arc<dyn CloudClients> = Arc::new(ClientFactory::from_credentials(creds)?);
//! let skill = create_oci_skill(clients);
//! let server = McpServer::builder().with_skill(&skill)?.build();
//! ```

pub mod cloud;
mod skill;

pub use cloud::{
    ANALYSIS_PROMPT, ANALYSIS_PROMPT_NAME, CloudOperation, CloudToolHandler, analysis_prompt,
    cloud_tool, create_oci_skill,
};
pub use skill::{PromptTemplate, Skill, SkillBuilder};
