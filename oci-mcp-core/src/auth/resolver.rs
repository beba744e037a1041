//! Credential resolution
//!
//! Three strategies are tried in order and the first that resolves wins:
//!
//! 1. the credential file (`OCI_CONFIG_FILE` or `~/.oci/config`)
//! 2. the five explicit `OCI_*` variables
//! 3. a delegated resource principal signer
//!
//! A strategy that does not apply yields [`Resolution::Continue`]. A hard error
//! (an existing but broken credential file) stops the chain.

use super::credentials::{AuthMode, OciConfig, ResolvedCredentials};
use super::env::{
    EXPLICIT_CREDENTIAL_VARS, EnvSource, OCI_CONFIG_FILE, OCI_CONFIG_PROFILE, OCI_FINGERPRINT,
    OCI_KEY_FILE, OCI_REGION, OCI_TENANCY_OCID, OCI_USER_OCID, ProcessEnv,
};
use super::profile::{DEFAULT_PROFILE, default_config_path, load_profile};
use super::signer::{RequestSigner, ResourcePrincipalSigner};
use crate::error::{OciMcpError, Result};
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Region used in delegated-signer mode when `OCI_REGION` is unset
pub const DEFAULT_DELEGATED_REGION: &str = "ap-melbourne-1";

/// Outcome of a single strategy
#[derive(Debug)]
pub enum Resolution {
    /// Credentials were produced
    Resolved(ResolvedCredentials),
    /// The strategy does not apply; try the next one
    Continue,
}

/// One credential mode
pub trait CredentialStrategy: Send + Sync {
    /// Strategy name for logs
    fn name(&self) -> &'static str;

    /// Attempt resolution
    fn resolve(&self, env: &dyn EnvSource) -> Result<Resolution>;
}

/// Produces the platform-delegated signer
pub trait DelegatedSignerProvider: Send + Sync {
    /// Obtain a signer, or explain why none is available
    fn signer(&self, env: &dyn EnvSource) -> Result<Arc<dyn RequestSigner>>;
}

/// Resource principal provider reading `OCI_RESOURCE_PRINCIPAL_*`
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourcePrincipalProvider;

impl DelegatedSignerProvider for ResourcePrincipalProvider {
    fn signer(&self, env: &dyn EnvSource) -> Result<Arc<dyn RequestSigner>> {
        Ok(Arc::new(ResourcePrincipalSigner::from_env(env)?))
    }
}

/// Credential file strategy
#[derive(Debug, Clone, Default)]
pub struct ConfigFileStrategy {
    default_path: Option<PathBuf>,
}

impl ConfigFileStrategy {
    /// Use `~/.oci/config` when `OCI_CONFIG_FILE` is unset
    pub fn new() -> Self {
        Self {
            default_path: default_config_path(),
        }
    }

    /// Use `path` when `OCI_CONFIG_FILE` is unset
    pub fn with_default_path(path: impl Into<PathBuf>) -> Self {
        Self {
            default_path: Some(path.into()),
        }
    }
}

impl CredentialStrategy for ConfigFileStrategy {
    fn name(&self) -> &'static str {
        "config_file"
    }

    fn resolve(&self, env: &dyn EnvSource) -> Result<Resolution> {
        let path = match env.non_empty(OCI_CONFIG_FILE) {
            Some(path) => super::profile::expand_home(&path),
            None => match &self.default_path {
                Some(path) => path.clone(),
                None => return Ok(Resolution::Continue),
            },
        };

        if !path.is_file() {
            debug!(path = %path.display(), "OCI config file not found");
            return Ok(Resolution::Continue);
        }

        let profile = env
            .non_empty(OCI_CONFIG_PROFILE)
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string());
        let config = load_profile(&path, &profile)?;

        info!(path = %path.display(), profile = %profile, "Using OCI config file");
        Ok(Resolution::Resolved(ResolvedCredentials::from_config(
            config,
            AuthMode::ConfigFile,
        )))
    }
}

/// Explicit environment variable strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentStrategy;

impl CredentialStrategy for EnvironmentStrategy {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn resolve(&self, env: &dyn EnvSource) -> Result<Resolution> {
        if !EXPLICIT_CREDENTIAL_VARS
            .iter()
            .all(|key| env.non_empty(key).is_some())
        {
            return Ok(Resolution::Continue);
        }

        let take = |key: &str| env.non_empty(key).unwrap_or_default();
        let config = OciConfig {
            user: Some(take(OCI_USER_OCID)),
            fingerprint: Some(take(OCI_FINGERPRINT)),
            tenancy: take(OCI_TENANCY_OCID),
            region: take(OCI_REGION),
            key_file: Some(PathBuf::from(take(OCI_KEY_FILE))),
            pass_phrase: None,
        };

        info!("Using OCI credentials from environment variables");
        Ok(Resolution::Resolved(ResolvedCredentials::from_config(
            config,
            AuthMode::Environment,
        )))
    }
}

/// Delegated signer strategy
pub struct ResourcePrincipalStrategy {
    provider: Arc<dyn DelegatedSignerProvider>,
}

impl ResourcePrincipalStrategy {
    /// Strategy backed by `provider`
    pub fn new(provider: Arc<dyn DelegatedSignerProvider>) -> Self {
        Self { provider }
    }
}

impl Default for ResourcePrincipalStrategy {
    fn default() -> Self {
        Self::new(Arc::new(ResourcePrincipalProvider))
    }
}

impl CredentialStrategy for ResourcePrincipalStrategy {
    fn name(&self) -> &'static str {
        "resource_principal"
    }

    fn resolve(&self, env: &dyn EnvSource) -> Result<Resolution> {
        match self.provider.signer(env) {
            Ok(signer) => {
                let region = env
                    .non_empty(OCI_REGION)
                    .unwrap_or_else(|| DEFAULT_DELEGATED_REGION.to_string());
                let tenancy = env.non_empty(OCI_TENANCY_OCID).unwrap_or_default();

                info!(region = %region, "Using OCI resource principal signer");
                Ok(Resolution::Resolved(ResolvedCredentials::with_signer(
                    OciConfig::minimal(region, tenancy),
                    signer,
                )))
            }
            Err(e) => {
                debug!(error = %e, "Resource principal signer unavailable");
                Ok(Resolution::Continue)
            }
        }
    }
}

/// Runs the strategy chain
pub struct CredentialResolver {
    strategies: Vec<Box<dyn CredentialStrategy>>,
}

impl CredentialResolver {
    /// The standard three-strategy chain
    pub fn new() -> Self {
        Self::with_provider(Arc::new(ResourcePrincipalProvider))
    }

    /// The standard chain with a custom delegated signer provider
    pub fn with_provider(provider: Arc<dyn DelegatedSignerProvider>) -> Self {
        Self::with_strategies(vec![
            Box::new(ConfigFileStrategy::new()),
            Box::new(EnvironmentStrategy),
            Box::new(ResourcePrincipalStrategy::new(provider)),
        ])
    }

    /// An explicit strategy chain
    pub fn with_strategies(strategies: Vec<Box<dyn CredentialStrategy>>) -> Self {
        Self { strategies }
    }

    /// Try each strategy in order
    pub fn resolve(&self, env: &dyn EnvSource) -> Result<ResolvedCredentials> {
        for strategy in &self.strategies {
            debug!(strategy = strategy.name(), "Trying credential strategy");
            if let Resolution::Resolved(credentials) = strategy.resolve(env)? {
                return Ok(credentials);
            }
        }
        Err(OciMcpError::NoCredentials)
    }

    /// Resolve into `cache` on first use; later calls return the cached value
    /// without running the chain. Failures are not cached.
    pub fn resolve_cached<'a>(
        &self,
        cache: &'a OnceCell<ResolvedCredentials>,
        env: &dyn EnvSource,
    ) -> Result<&'a ResolvedCredentials> {
        cache.get_or_try_init(|| self.resolve(env))
    }
}

impl Default for CredentialResolver {
    fn default() -> Self {
        Self::new()
    }
}

static RESOLVED: OnceCell<ResolvedCredentials> = OnceCell::new();

/// Resolve from the process environment once per process
pub fn resolve_credentials() -> Result<&'static ResolvedCredentials> {
    CredentialResolver::new().resolve_cached(&RESOLVED, &ProcessEnv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::env::{OCI_RESOURCE_PRINCIPAL_RPST, OCI_RESOURCE_PRINCIPAL_VERSION};
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubSigner;

    impl RequestSigner for StubSigner {
        fn key_id(&self) -> String {
            "ST$stub".to_string()
        }

        fn sign(&self, _message: &[u8]) -> Result<Vec<u8>> {
            Ok(vec![0; 4])
        }
    }

    /// Counts attempts; succeeds only when configured to
    struct CountingProvider {
        calls: AtomicUsize,
        succeed: bool,
    }

    impl CountingProvider {
        fn new(succeed: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                succeed,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl DelegatedSignerProvider for CountingProvider {
        fn signer(&self, _env: &dyn EnvSource) -> Result<Arc<dyn RequestSigner>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                Ok(Arc::new(StubSigner))
            } else {
                Err(OciMcpError::Configuration("not on OCI".into()))
            }
        }
    }

    fn resolver(default_path: PathBuf, provider: Arc<CountingProvider>) -> CredentialResolver {
        CredentialResolver::with_strategies(vec![
            Box::new(ConfigFileStrategy::with_default_path(default_path)),
            Box::new(EnvironmentStrategy),
            Box::new(ResourcePrincipalStrategy::new(provider)),
        ])
    }

    fn missing_path() -> PathBuf {
        PathBuf::from("/nonexistent/oci-mcp/config")
    }

    fn full_env() -> HashMap<String, String> {
        [
            (OCI_USER_OCID, "ocid1.user.oc1..env"),
            (OCI_FINGERPRINT, "11:22:33"),
            (OCI_TENANCY_OCID, "ocid1.tenancy.oc1..env"),
            (OCI_REGION, "uk-london-1"),
            (OCI_KEY_FILE, "/keys/env.pem"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const VALID_CONFIG: &str = "\
[DEFAULT]
user=ocid1.user.oc1..file
fingerprint=aa:bb
key_file=/keys/file.pem
tenancy=ocid1.tenancy.oc1..file
region=us-ashburn-1
";

    #[test]
    fn test_config_file_wins_and_later_modes_not_attempted() {
        let file = config_file(VALID_CONFIG);
        let provider = CountingProvider::new(true);
        let mut env = full_env();
        env.insert(OCI_CONFIG_FILE.into(), file.path().display().to_string());

        let resolved = resolver(missing_path(), provider.clone())
            .resolve(&env)
            .unwrap();

        assert_eq!(resolved.mode, AuthMode::ConfigFile);
        assert_eq!(resolved.config.user.as_deref(), Some("ocid1.user.oc1..file"));
        assert!(resolved.signer.is_none());
        assert_eq!(provider.calls(), 0);
    }

    #[test]
    fn test_default_path_used_when_env_unset() {
        let file = config_file(VALID_CONFIG);
        let provider = CountingProvider::new(false);
        let env: HashMap<String, String> = HashMap::new();

        let resolved = resolver(file.path().to_path_buf(), provider.clone())
            .resolve(&env)
            .unwrap();
        assert_eq!(resolved.mode, AuthMode::ConfigFile);
        assert_eq!(resolved.region(), "us-ashburn-1");
    }

    #[test]
    fn test_profile_selected_from_env() {
        let file = config_file(&format!("{}\n[OTHER]\nregion=sa-saopaulo-1\n", VALID_CONFIG));
        let mut env = HashMap::new();
        env.insert(OCI_CONFIG_FILE.to_string(), file.path().display().to_string());
        env.insert(OCI_CONFIG_PROFILE.to_string(), "OTHER".to_string());

        let resolved = resolver(missing_path(), CountingProvider::new(false))
            .resolve(&env)
            .unwrap();
        assert_eq!(resolved.region(), "sa-saopaulo-1");
        assert_eq!(resolved.tenancy(), "ocid1.tenancy.oc1..file");
    }

    #[test]
    fn test_broken_config_file_is_fatal() {
        let file = config_file(VALID_CONFIG);
        let provider = CountingProvider::new(true);
        let mut env = full_env();
        env.insert(OCI_CONFIG_FILE.into(), file.path().display().to_string());
        env.insert(OCI_CONFIG_PROFILE.into(), "MISSING".into());

        let err = resolver(missing_path(), provider.clone())
            .resolve(&env)
            .unwrap_err();
        assert!(matches!(err, OciMcpError::Configuration(_)));
        assert!(err.is_fatal());
        assert_eq!(provider.calls(), 0);
    }

    #[test]
    fn test_environment_mode_takes_values_verbatim() {
        let provider = CountingProvider::new(true);
        let resolved = resolver(missing_path(), provider.clone())
            .resolve(&full_env())
            .unwrap();

        assert_eq!(resolved.mode, AuthMode::Environment);
        assert_eq!(resolved.config.user.as_deref(), Some("ocid1.user.oc1..env"));
        assert_eq!(resolved.config.fingerprint.as_deref(), Some("11:22:33"));
        assert_eq!(resolved.tenancy(), "ocid1.tenancy.oc1..env");
        assert_eq!(resolved.region(), "uk-london-1");
        assert_eq!(resolved.config.key_file, Some(PathBuf::from("/keys/env.pem")));
        assert!(resolved.signer.is_none());
        assert_eq!(provider.calls(), 0);
    }

    #[test]
    fn test_partial_environment_falls_through_to_delegated() {
        let provider = CountingProvider::new(true);
        let mut env = full_env();
        env.remove(OCI_KEY_FILE);

        let resolved = resolver(missing_path(), provider.clone())
            .resolve(&env)
            .unwrap();

        assert_eq!(provider.calls(), 1);
        assert_eq!(resolved.mode, AuthMode::ResourcePrincipal);
        assert!(resolved.signer.is_some());
        // OCI_REGION and OCI_TENANCY_OCID still apply
        assert_eq!(resolved.region(), "uk-london-1");
        assert_eq!(resolved.tenancy(), "ocid1.tenancy.oc1..env");
    }

    #[test]
    fn test_empty_variable_counts_as_missing() {
        let provider = CountingProvider::new(false);
        let mut env = full_env();
        env.insert(OCI_FINGERPRINT.into(), String::new());

        let err = resolver(missing_path(), provider.clone())
            .resolve(&env)
            .unwrap_err();
        assert!(matches!(err, OciMcpError::NoCredentials));
        assert_eq!(provider.calls(), 1);
    }

    #[test]
    fn test_delegated_defaults() {
        let provider = CountingProvider::new(true);
        let env: HashMap<String, String> = HashMap::new();

        let resolved = resolver(missing_path(), provider).resolve(&env).unwrap();
        assert_eq!(resolved.region(), DEFAULT_DELEGATED_REGION);
        assert_eq!(resolved.tenancy(), "");
        assert_eq!(resolved.signer.as_ref().unwrap().key_id(), "ST$stub");
    }

    #[test]
    fn test_nothing_available_is_no_credentials() {
        let env: HashMap<String, String> = HashMap::new();
        let err = resolver(missing_path(), CountingProvider::new(false))
            .resolve(&env)
            .unwrap_err();
        assert!(matches!(err, OciMcpError::NoCredentials));
        assert!(err.to_string().contains("oci setup config"));
    }

    #[test]
    fn test_real_provider_declines_without_version() {
        let mut env = HashMap::new();
        env.insert(OCI_RESOURCE_PRINCIPAL_RPST.to_string(), "tok".to_string());
        let strategy = ResourcePrincipalStrategy::default();
        assert!(matches!(
            strategy.resolve(&env).unwrap(),
            Resolution::Continue
        ));

        env.insert(OCI_RESOURCE_PRINCIPAL_VERSION.to_string(), "2.2".to_string());
        // Still no key material
        assert!(matches!(
            strategy.resolve(&env).unwrap(),
            Resolution::Continue
        ));
    }

    #[test]
    fn test_cached_resolution_runs_chain_once() {
        let provider = CountingProvider::new(true);
        let resolver = resolver(missing_path(), provider.clone());
        let cache = OnceCell::new();
        let env: HashMap<String, String> = HashMap::new();

        let first = resolver.resolve_cached(&cache, &env).unwrap();
        let second = resolver.resolve_cached(&cache, &env).unwrap();

        assert!(std::ptr::eq(first, second));
        assert_eq!(first.mode, AuthMode::ResourcePrincipal);
        assert_eq!(provider.calls(), 1);
    }

    #[test]
    fn test_failed_resolution_is_not_cached() {
        let provider = CountingProvider::new(false);
        let resolver = resolver(missing_path(), provider.clone());
        let cache = OnceCell::new();
        let env: HashMap<String, String> = HashMap::new();

        assert!(matches!(
            resolver.resolve_cached(&cache, &env),
            Err(OciMcpError::NoCredentials)
        ));
        assert!(resolver.resolve_cached(&cache, &env).is_err());
        assert_eq!(provider.calls(), 2);
        assert!(cache.get().is_none());
    }
}
