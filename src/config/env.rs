use std::path::PathBuf;

/// Environment variable naming the config document
pub const CONFIG_PATH_VAR: &str = "CONFIG_PATH";
/// Environment variable holding the Syncthing API key
pub const API_KEY_VAR: &str = "SYNCTHING_API_KEY";

const DEFAULT_CONFIG_PATH: &str = "/config/config.yaml";

/// Process settings read from the environment at startup
#[derive(Debug, Clone)]
pub struct EnvSettings {
    pub config_path: PathBuf,
    pub api_key: String,
}

impl EnvSettings {
    /// Read settings from the process environment
    /// CONFIG_PATH=/config/config.yaml
    /// SYNCTHING_API_KEY=<required>
    pub fn from_env() -> Result<Self, MissingCredentialError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MissingCredentialError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .filter(|k| !k.is_empty())
            .ok_or(MissingCredentialError(API_KEY_VAR))?;

        let config_path = lookup(CONFIG_PATH_VAR)
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        Ok(Self {
            config_path: PathBuf::from(config_path),
            api_key,
        })
    }
}

/// The API key credential is not set
#[derive(Debug, thiserror::Error)]
#[error("{0} environment variable is required")]
pub struct MissingCredentialError(pub &'static str);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_config_path() {
        let settings = EnvSettings::from_lookup(lookup_from(&[(API_KEY_VAR, "secret")])).unwrap();
        assert_eq!(settings.config_path, PathBuf::from("/config/config.yaml"));
        assert_eq!(settings.api_key, "secret");
    }

    #[test]
    fn test_custom_config_path() {
        let settings = EnvSettings::from_lookup(lookup_from(&[
            (API_KEY_VAR, "secret"),
            (CONFIG_PATH_VAR, "/etc/hc.yaml"),
        ]))
        .unwrap();
        assert_eq!(settings.config_path, PathBuf::from("/etc/hc.yaml"));
    }

    #[test]
    fn test_missing_api_key() {
        let err = EnvSettings::from_lookup(lookup_from(&[])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "SYNCTHING_API_KEY environment variable is required"
        );
    }

    #[test]
    fn test_empty_api_key_counts_as_missing() {
        assert!(EnvSettings::from_lookup(lookup_from(&[(API_KEY_VAR, "")])).is_err());
    }
}
