//! Error types for OCI MCP operations

/// Result type for OCI MCP operations
pub type Result<T> = std::result::Result<T, OciMcpError>;

/// Variables consulted by the explicit-fields credential mode, in message order
pub const CREDENTIAL_ENV_HINT: &str =
    "OCI_USER_OCID, OCI_FINGERPRINT, OCI_TENANCY_OCID, OCI_REGION, OCI_KEY_FILE";

/// Error types for the OCI MCP server
#[derive(Debug, thiserror::Error)]
pub enum OciMcpError {
    /// No credential mode succeeded at startup
    #[error(
        "No OCI credentials found. Run `oci setup config` or set env vars ({}).",
        CREDENTIAL_ENV_HINT
    )]
    NoCredentials,

    /// Configuration error (credential file, key material, server config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A caller-supplied value is outside the accepted vocabulary
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The build was produced without the Usage API client
    #[error("Usage API client not available; rebuild with the `usage-api` feature.")]
    UsageApiUnavailable,

    /// Request signing failed
    #[error("Signing error: {0}")]
    Signing(String),

    /// The OCI service answered with a non-success status
    #[error("OCI service error ({status} {code}): {message}")]
    Service {
        /// HTTP status code
        status: u16,
        /// OCI error code, e.g. `NotAuthorizedOrNotFound`
        code: String,
        /// Service-provided message
        message: String,
        /// Request id to quote to OCI support
        opc_request_id: Option<String>,
    },

    /// Transport failure before a response was received
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl OciMcpError {
    /// Build an invalid-argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        OciMcpError::InvalidArgument(message.into())
    }

    /// Whether this error should abort startup rather than a single call
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            OciMcpError::NoCredentials | OciMcpError::Configuration(_)
        )
    }

    /// HTTP status for service errors
    pub fn status(&self) -> Option<u16> {
        match self {
            OciMcpError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<String> for OciMcpError {
    fn from(s: String) -> Self {
        OciMcpError::Other(s)
    }
}

impl From<&str> for OciMcpError {
    fn from(s: &str) -> Self {
        OciMcpError::Other(s.to_string())
    }
}

impl From<anyhow::Error> for OciMcpError {
    fn from(err: anyhow::Error) -> Self {
        OciMcpError::Other(err.to_string())
    }
}
