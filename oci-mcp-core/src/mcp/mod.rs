//! Model Context Protocol (MCP) server
//!
//! JSON-RPC 2.0 over newline-delimited stdio. Handled methods:
//! - `initialize`, `ping` and the `notifications/*` family
//! - `tools/list`, `tools/call`
//! - `resources/list`, `resources/read`
//! - `prompts/list`, `prompts/get`
//!
//! ```rust,ignore
//! let server = McpServer::from_config(&config, clients)?;
//! server.run(StdioTransport::new()).await?;
//! ```

mod protocol;
mod resources;
mod server;
mod transport;

pub use protocol::*;
pub use resources::{COMPARTMENTS_URI, CompartmentsResource, ResourceProvider};
pub use server::{McpServer, McpServerBuilder, McpServerConfig};
pub use transport::{Inbound, LineTransport, MemoryTransport, StdioTransport, Transport};
