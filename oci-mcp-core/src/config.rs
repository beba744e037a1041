//! Server configuration
//!
//! Layered with figment: built-in defaults, then `oci-mcp.toml` (or the file
//! named by `OCI_MCP_CONFIG_PATH`), then `OCI_MCP_*` variables, then the
//! plain `LOG_LEVEL` and `DEFAULT_COMPARTMENT_OCID` variables.

use crate::error::{OciMcpError, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "oci-mcp.toml";

/// Variable naming an alternative configuration file
pub const CONFIG_PATH_ENV: &str = "OCI_MCP_CONFIG_PATH";

/// Prefix of server configuration overrides
pub const ENV_PREFIX: &str = "OCI_MCP_";

/// Log level names accepted in `LOG_LEVEL`
const LOG_LEVELS: [&str; 7] = ["TRACE", "DEBUG", "INFO", "WARN", "WARNING", "ERROR", "CRITICAL"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Name announced in the `initialize` response
    pub name: String,

    /// Log level name, e.g. `INFO` or `DEBUG`
    pub log_level: String,

    /// Scope used when a tool call names no compartment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_compartment: Option<String>,

    /// Whether `instance_action` is listed and callable
    pub allow_mutations: bool,

    /// Base URL used for every service instead of the regional endpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_override: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "oci-mcp-server".to_string(),
            log_level: "INFO".to_string(),
            default_compartment: None,
            allow_mutations: true,
            endpoint_override: None,
        }
    }
}

impl ServerConfig {
    /// The provider stack, with `file` as the TOML layer
    pub fn figment(file: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(ServerConfig::default()))
            .merge(Toml::file(file.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(
                Env::raw()
                    .only(&["LOG_LEVEL", "DEFAULT_COMPARTMENT_OCID"])
                    .map(|key| {
                        if key == "default_compartment_ocid" {
                            "default_compartment".into()
                        } else {
                            key.into()
                        }
                    }),
            )
    }

    /// Load configuration from the default locations
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a source is malformed or the result
    /// fails validation.
    pub fn load() -> Result<Self> {
        let file =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::from_figment(Self::figment(file))
    }

    /// Load with an explicit TOML file in place of the default one
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_figment(Self::figment(path))
    }

    fn from_figment(figment: Figment) -> Result<Self> {
        let config: ServerConfig = figment.extract().map_err(|e| {
            OciMcpError::Configuration(format!("Failed to load configuration: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(OciMcpError::Configuration(
                "server name must not be empty".to_string(),
            ));
        }
        let level = self.log_level.to_uppercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(OciMcpError::Configuration(format!(
                "Unknown log level '{}'. Expected one of: {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }

    /// `log_level` as a tracing filter directive
    pub fn tracing_directive(&self) -> &'static str {
        match self.log_level.to_uppercase().as_str() {
            "TRACE" => "trace",
            "DEBUG" => "debug",
            "WARN" | "WARNING" => "warn",
            "ERROR" | "CRITICAL" => "error",
            _ => "info",
        }
    }

    /// Default compartment, ignoring an empty value
    pub fn default_compartment(&self) -> Option<&str> {
        self.default_compartment
            .as_deref()
            .filter(|c| !c.trim().is_empty())
    }
}
