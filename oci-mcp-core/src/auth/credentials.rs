//! Resolved OCI configuration and credential bundle

use super::signer::RequestSigner;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration fields consumed by signers and tools.
///
/// Populated from the credential file, from the explicit environment
/// variables, or minimally (region and tenancy only) in delegated-signer mode.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OciConfig {
    /// User OCID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// API key fingerprint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    /// Tenancy OCID (empty when unknown in delegated-signer mode)
    pub tenancy: String,

    /// Region identifier, e.g. `us-ashburn-1`
    pub region: String,

    /// Path to the PEM private key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_file: Option<PathBuf>,

    /// Key passphrase from the credential file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_phrase: Option<String>,
}

impl OciConfig {
    /// Configuration for the delegated-signer mode: region and tenancy only
    pub fn minimal(region: impl Into<String>, tenancy: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            tenancy: tenancy.into(),
            ..Default::default()
        }
    }

    /// Look a field up by its credential-file key name
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "user" => self.user.clone(),
            "fingerprint" => self.fingerprint.clone(),
            "tenancy" => Some(self.tenancy.clone()),
            "region" => Some(self.region.clone()),
            "key_file" => self.key_file.as_ref().map(|p| p.display().to_string()),
            "pass_phrase" => self.pass_phrase.clone(),
            _ => None,
        }
    }
}

impl fmt::Debug for OciConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OciConfig")
            .field("user", &self.user)
            .field("fingerprint", &self.fingerprint)
            .field("tenancy", &self.tenancy)
            .field("region", &self.region)
            .field("key_file", &self.key_file)
            .field("pass_phrase", &self.pass_phrase.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Which credential mode produced the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// `~/.oci/config` (or `OCI_CONFIG_FILE`) profile
    ConfigFile,
    /// The five explicit environment variables
    Environment,
    /// Platform-provided resource principal signer
    ResourcePrincipal,
}

impl AuthMode {
    /// Short name for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::ConfigFile => "config_file",
            AuthMode::Environment => "environment",
            AuthMode::ResourcePrincipal => "resource_principal",
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of credential resolution
///
/// When `signer` is present it is the only signing identity; the config then
/// only supplies tenancy and region defaults.
#[derive(Clone)]
pub struct ResolvedCredentials {
    /// Resolved configuration
    pub config: OciConfig,
    /// Delegated signer, present only in resource principal mode
    pub signer: Option<Arc<dyn RequestSigner>>,
    /// Mode that succeeded
    pub mode: AuthMode,
}

impl ResolvedCredentials {
    /// Credentials backed by configuration fields only
    pub fn from_config(config: OciConfig, mode: AuthMode) -> Self {
        Self {
            config,
            signer: None,
            mode,
        }
    }

    /// Credentials backed by a delegated signer
    pub fn with_signer(config: OciConfig, signer: Arc<dyn RequestSigner>) -> Self {
        Self {
            config,
            signer: Some(signer),
            mode: AuthMode::ResourcePrincipal,
        }
    }

    /// Tenancy OCID
    pub fn tenancy(&self) -> &str {
        &self.config.tenancy
    }

    /// Region identifier
    pub fn region(&self) -> &str {
        &self.config.region
    }
}

impl fmt::Debug for ResolvedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCredentials")
            .field("config", &self.config)
            .field("has_signer", &self.signer.is_some())
            .field("mode", &self.mode)
            .finish()
    }
}
