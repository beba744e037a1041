//! OCI credential file (`~/.oci/config`) loading
//!
//! The file is INI formatted. Keys in the `DEFAULT` section are inherited by
//! every other profile, and a named profile overrides them.

use super::credentials::OciConfig;
use crate::error::{OciMcpError, Result};
use ini::Ini;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default profile name
pub const DEFAULT_PROFILE: &str = "DEFAULT";

/// Keys every profile must provide
pub const REQUIRED_KEYS: [&str; 5] = ["user", "fingerprint", "key_file", "tenancy", "region"];

/// Default credential file location: `~/.oci/config`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".oci").join("config"))
}

/// Expand a leading `~` to the user's home directory
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Load `profile` from the credential file at `path`.
///
/// # Errors
///
/// Returns a configuration error when the file cannot be parsed, the profile
/// is absent, or a required key is missing.
pub fn load_profile(path: &Path, profile: &str) -> Result<OciConfig> {
    let ini = Ini::load_from_file(path).map_err(|e| {
        OciMcpError::Configuration(format!(
            "Failed to read OCI config file {}: {}",
            path.display(),
            e
        ))
    })?;

    let values = profile_values(&ini, profile).ok_or_else(|| {
        OciMcpError::Configuration(format!(
            "Profile '{}' not found in OCI config file {}",
            profile,
            path.display()
        ))
    })?;

    let missing: Vec<&str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| values.get(*key).is_none_or(|v| v.is_empty()))
        .collect();
    if !missing.is_empty() {
        return Err(OciMcpError::Configuration(format!(
            "Profile '{}' in {} is missing required keys: {}",
            profile,
            path.display(),
            missing.join(", ")
        )));
    }

    let take = |key: &str| values.get(key).cloned().unwrap_or_default();

    Ok(OciConfig {
        user: Some(take("user")),
        fingerprint: Some(take("fingerprint")),
        tenancy: take("tenancy"),
        region: take("region"),
        key_file: Some(expand_home(&take("key_file"))),
        pass_phrase: values.get("pass_phrase").filter(|v| !v.is_empty()).cloned(),
    })
}

/// Merge `DEFAULT` with the named profile. `None` when the profile is absent.
fn profile_values(ini: &Ini, profile: &str) -> Option<BTreeMap<String, String>> {
    let mut values = BTreeMap::new();

    if let Some(defaults) = ini.section(Some(DEFAULT_PROFILE)) {
        for (key, value) in defaults.iter() {
            values.insert(key.to_string(), value.to_string());
        }
    }

    if profile == DEFAULT_PROFILE {
        return ini.section(Some(DEFAULT_PROFILE)).map(|_| values);
    }

    let section = ini.section(Some(profile))?;
    for (key, value) in section.iter() {
        values.insert(key.to_string(), value.to_string());
    }
    Some(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const SAMPLE: &str = "\
[DEFAULT]
user=ocid1.user.oc1..default
fingerprint=aa:bb:cc
key_file=/keys/default.pem
tenancy=ocid1.tenancy.oc1..root
region=us-ashburn-1

[DEV]
user=ocid1.user.oc1..dev
region=eu-frankfurt-1
pass_phrase=
";

    #[test]
    fn test_load_default_profile() {
        let file = write_config(SAMPLE);
        let config = load_profile(file.path(), "DEFAULT").unwrap();

        assert_eq!(config.user.as_deref(), Some("ocid1.user.oc1..default"));
        assert_eq!(config.fingerprint.as_deref(), Some("aa:bb:cc"));
        assert_eq!(config.tenancy, "ocid1.tenancy.oc1..root");
        assert_eq!(config.region, "us-ashburn-1");
        assert_eq!(config.key_file, Some(PathBuf::from("/keys/default.pem")));
        assert!(config.pass_phrase.is_none());
    }

    #[test]
    fn test_named_profile_inherits_default() {
        let file = write_config(SAMPLE);
        let config = load_profile(file.path(), "DEV").unwrap();

        assert_eq!(config.user.as_deref(), Some("ocid1.user.oc1..dev"));
        assert_eq!(config.region, "eu-frankfurt-1");
        // Inherited from DEFAULT
        assert_eq!(config.tenancy, "ocid1.tenancy.oc1..root");
        assert_eq!(config.fingerprint.as_deref(), Some("aa:bb:cc"));
    }

    #[test]
    fn test_missing_profile_is_configuration_error() {
        let file = write_config(SAMPLE);
        let err = load_profile(file.path(), "PROD").unwrap_err();
        assert!(matches!(err, OciMcpError::Configuration(_)));
        assert!(err.to_string().contains("PROD"));
    }

    #[test]
    fn test_missing_required_key() {
        let file = write_config(
            "[DEFAULT]\nuser=u\nfingerprint=f\ntenancy=t\nregion=r\n",
        );
        let err = load_profile(file.path(), "DEFAULT").unwrap_err();
        assert!(err.to_string().contains("key_file"));
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/key.pem"), PathBuf::from("/abs/key.pem"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/.oci/key.pem"), home.join(".oci/key.pem"));
        }
    }
}
