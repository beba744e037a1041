//! Outcome of a tool call and the error model
//!
//! Every call yields a [`ToolResultEnvelope`]: the value or a classified
//! [`ToolError`], plus provenance for the call log.

use super::tool::args_hash;
use crate::error::OciMcpError;
use crate::tools::Capability;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResultEnvelope {
    pub outcome: ToolOutcome,
    pub provenance: ToolProvenance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Success { value: Value },
    Error { error: ToolError },
}

impl ToolResultEnvelope {
    pub fn success(value: Value, provenance: ToolProvenance) -> Self {
        Self {
            outcome: ToolOutcome::Success { value },
            provenance,
        }
    }

    pub fn failure(error: ToolError, provenance: ToolProvenance) -> Self {
        Self {
            outcome: ToolOutcome::Error { error },
            provenance,
        }
    }

    pub fn from_result(result: Result<Value, ToolError>, provenance: ToolProvenance) -> Self {
        match result {
            Ok(value) => Self::success(value, provenance),
            Err(error) => Self::failure(error, provenance),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Success { .. })
    }

    pub fn value(&self) -> Option<&Value> {
        match &self.outcome {
            ToolOutcome::Success { value } => Some(value),
            ToolOutcome::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ToolError> {
        match &self.outcome {
            ToolOutcome::Error { error } => Some(error),
            ToolOutcome::Success { .. } => None,
        }
    }
}

/// How a call failed, in terms a caller can act on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    /// Arguments the schema or the operation rejected
    Validation,
    CapabilityDenied,
    RateLimited,
    Transient,
    NotFound,
    /// 401/403 from OCI
    PermissionDenied,
    InvalidResponse,
    Internal,
}

impl ToolErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolErrorKind::Validation => "validation",
            ToolErrorKind::CapabilityDenied => "capability_denied",
            ToolErrorKind::RateLimited => "rate_limited",
            ToolErrorKind::Transient => "transient",
            ToolErrorKind::NotFound => "not_found",
            ToolErrorKind::PermissionDenied => "permission_denied",
            ToolErrorKind::InvalidResponse => "invalid_response",
            ToolErrorKind::Internal => "internal",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
    /// OCI service error code, or one of ours for local failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
            context: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    /// Schema violations, one clause per argument
    pub fn validation(errors: Vec<ValidationError>) -> Self {
        let clauses: Vec<String> = errors.iter().map(ToString::to_string).collect();
        Self::new(
            ToolErrorKind::Validation,
            format!("Invalid arguments: {}", clauses.join("; ")),
        )
        .with_code("INVALID_ARGUMENT")
        .with_context(json!({ "fields": errors }))
    }

    pub fn capability_denied(tool: &str, missing: &[Capability]) -> Self {
        let names: Vec<&str> = missing.iter().map(Capability::as_str).collect();
        Self::new(
            ToolErrorKind::CapabilityDenied,
            format!(
                "Tool '{}' is disabled by server policy (needs {})",
                tool,
                names.join(", ")
            ),
        )
        .with_code("CAPABILITY_DENIED")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Internal, message)
    }

    /// Request id OCI assigned to the failed call, when there was one
    pub fn opc_request_id(&self) -> Option<&str> {
        self.context.as_ref()?.get("opc_request_id")?.as_str()
    }

    /// Message for the caller, quoting the OCI request id when known
    pub fn caller_message(&self) -> String {
        match self.opc_request_id() {
            Some(request_id) => format!("{} (opc-request-id: {})", self.message, request_id),
            None => self.message.clone(),
        }
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ToolError {}

impl From<OciMcpError> for ToolError {
    fn from(err: OciMcpError) -> Self {
        let message = err.to_string();
        match err {
            OciMcpError::InvalidArgument(_) => {
                ToolError::new(ToolErrorKind::Validation, message).with_code("INVALID_ARGUMENT")
            }
            OciMcpError::Service {
                status,
                code,
                opc_request_id,
                ..
            } => {
                let kind = match status {
                    404 => ToolErrorKind::NotFound,
                    401 | 403 => ToolErrorKind::PermissionDenied,
                    429 => ToolErrorKind::RateLimited,
                    500..=599 => ToolErrorKind::Transient,
                    _ => ToolErrorKind::Internal,
                };
                ToolError::new(kind, message)
                    .with_code(code)
                    .with_context(json!({
                        "status": status,
                        "opc_request_id": opc_request_id,
                    }))
            }
            OciMcpError::Transport(_) => ToolError::new(ToolErrorKind::Transient, message),
            OciMcpError::Serialization(_) => ToolError::new(ToolErrorKind::InvalidResponse, message),
            OciMcpError::UsageApiUnavailable => {
                ToolError::internal(message).with_code("USAGE_API_UNAVAILABLE")
            }
            _ => ToolError::internal(message),
        }
    }
}

/// One rejected argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' {}", self.field, self.message)
    }
}

/// Call metadata for the log. Arguments are recorded only as a hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolProvenance {
    pub tool_name: String,
    pub args_hash: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ToolProvenance {
    /// Stamp the start of a call
    pub fn start(tool_name: impl Into<String>, args: &Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            args_hash: args_hash(args),
            started_at: Utc::now(),
            duration_ms: 0,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: Option<&str>) -> Self {
        self.request_id = request_id.map(str::to_string);
        self
    }

    /// Record the elapsed time since `start`
    pub fn finish(mut self) -> Self {
        let elapsed = Utc::now() - self.started_at;
        self.duration_ms = u64::try_from(elapsed.num_milliseconds()).unwrap_or(0);
        self
    }
}
