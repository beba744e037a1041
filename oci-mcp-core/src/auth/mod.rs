//! OCI authentication
//!
//! Credential resolution, request signers and the HTTP signature scheme.

pub mod credentials;
pub mod env;
pub mod http_signature;
pub mod profile;
pub mod resolver;
pub mod signer;

pub use credentials::{AuthMode, OciConfig, ResolvedCredentials};
pub use env::{EnvSource, ProcessEnv};
pub use http_signature::sign_request;
pub use resolver::{
    ConfigFileStrategy, CredentialResolver, CredentialStrategy, DelegatedSignerProvider,
    EnvironmentStrategy, Resolution, ResourcePrincipalProvider, ResourcePrincipalStrategy,
    resolve_credentials,
};
pub use signer::{ApiKeySigner, RequestSigner, ResourcePrincipalSigner};
