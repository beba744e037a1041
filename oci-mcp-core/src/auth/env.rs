//! Environment access used by credential resolution
//!
//! Resolution reads the environment through [`EnvSource`] so tests can supply
//! a fixed map instead of mutating the process environment.

use std::collections::HashMap;

/// Config file path override
pub const OCI_CONFIG_FILE: &str = "OCI_CONFIG_FILE";
/// Config file profile override
pub const OCI_CONFIG_PROFILE: &str = "OCI_CONFIG_PROFILE";
/// Explicit-fields mode: user OCID
pub const OCI_USER_OCID: &str = "OCI_USER_OCID";
/// Explicit-fields mode: API key fingerprint
pub const OCI_FINGERPRINT: &str = "OCI_FINGERPRINT";
/// Explicit-fields mode (and delegated mode override): tenancy OCID
pub const OCI_TENANCY_OCID: &str = "OCI_TENANCY_OCID";
/// Explicit-fields mode (and delegated mode override): region identifier
pub const OCI_REGION: &str = "OCI_REGION";
/// Explicit-fields mode: private key path
pub const OCI_KEY_FILE: &str = "OCI_KEY_FILE";

/// The five variables that must all be set for the explicit-fields mode
pub const EXPLICIT_CREDENTIAL_VARS: [&str; 5] = [
    OCI_USER_OCID,
    OCI_FINGERPRINT,
    OCI_TENANCY_OCID,
    OCI_REGION,
    OCI_KEY_FILE,
];

/// Resource principal protocol version
pub const OCI_RESOURCE_PRINCIPAL_VERSION: &str = "OCI_RESOURCE_PRINCIPAL_VERSION";
/// Resource principal session token, or an absolute path to it
pub const OCI_RESOURCE_PRINCIPAL_RPST: &str = "OCI_RESOURCE_PRINCIPAL_RPST";
/// Resource principal private key PEM, or an absolute path to it
pub const OCI_RESOURCE_PRINCIPAL_PRIVATE_PEM: &str = "OCI_RESOURCE_PRINCIPAL_PRIVATE_PEM";
/// Passphrase for the resource principal key (unsupported)
pub const OCI_RESOURCE_PRINCIPAL_PRIVATE_PEM_PASSPHRASE: &str =
    "OCI_RESOURCE_PRINCIPAL_PRIVATE_PEM_PASSPHRASE";

/// Source of environment variables
pub trait EnvSource: Send + Sync {
    /// Raw value of `key`, if set
    fn var(&self, key: &str) -> Option<String>;

    /// Value of `key` when set to a non-empty string
    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key).filter(|v| !v.is_empty())
    }
}

/// Reads the real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}
