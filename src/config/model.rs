//! Configuration document types

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use super::duration::parse_duration;
use super::ConfigError;

const DEFAULT_CHECK_INTERVAL: &str = "1h";
const DEFAULT_SYNCTHING_URL: &str = "http://localhost:8384";

/// Validated service configuration, loaded once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Seconds to sleep between check cycles
    pub check_interval_secs: u64,
    /// Syncthing connection settings
    pub syncthing: SyncthingConfig,
    /// Devices to check, in configured order
    pub devices: Vec<DeviceEntry>,
}

/// Syncthing connection settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SyncthingConfig {
    /// Base URL of the REST API, without a trailing slash
    #[serde(default = "default_syncthing_url")]
    pub url: String,
}

impl Default for SyncthingConfig {
    fn default() -> Self {
        Self {
            url: default_syncthing_url(),
        }
    }
}

fn default_syncthing_url() -> String {
    DEFAULT_SYNCTHING_URL.to_string()
}

fn default_check_interval() -> String {
    DEFAULT_CHECK_INTERVAL.to_string()
}

/// Shape of the YAML document before validation
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default = "default_check_interval")]
    check_interval: String,
    #[serde(default)]
    syncthing: Option<SyncthingConfig>,
    #[serde(default)]
    devices: Option<Vec<DeviceEntry>>,
}

impl Config {
    /// Build a config with the given interval and no devices.
    pub fn new(check_interval_secs: u64) -> Self {
        Self {
            check_interval_secs,
            syncthing: SyncthingConfig::default(),
            devices: Vec::new(),
        }
    }

    /// Set the Syncthing base URL
    pub fn with_syncthing_url(mut self, url: impl Into<String>) -> Self {
        self.syncthing.url = normalize_url(url.into());
        self
    }

    /// Append a device entry
    pub fn with_device(mut self, device: DeviceEntry) -> Self {
        self.devices.push(device);
        self
    }

    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml_str(&contents)
    }

    /// Parse configuration from YAML text.
    ///
    /// Every duration in the document is validated here, so a malformed
    /// value stops startup. Missing device fields and blank ids are left to
    /// [`DeviceEntry::resolve`] when the device is checked.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_yaml::from_str(contents)?;

        let check_interval_secs = parse_duration(&raw.check_interval)?;
        let devices = raw.devices.unwrap_or_default();
        for max in devices.iter().filter_map(|d| d.max_unavailability.as_deref()) {
            parse_duration(max)?;
        }

        let mut syncthing = raw.syncthing.unwrap_or_default();
        syncthing.url = normalize_url(syncthing.url);

        Ok(Self {
            check_interval_secs,
            syncthing,
            devices,
        })
    }

    /// Interval between check cycles
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }
}

fn normalize_url(url: String) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    trimmed.to_string()
}

/// A device entry exactly as written in the config document
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeviceEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub max_unavailability: Option<String>,
    #[serde(default)]
    pub webhook_url: Option<String>,
}

impl DeviceEntry {
    /// Create a fully populated entry
    pub fn new(
        id: impl Into<String>,
        max_unavailability: impl Into<String>,
        webhook_url: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            max_unavailability: Some(max_unavailability.into()),
            webhook_url: Some(webhook_url.into()),
        }
    }

    /// Validate the entry into a [`DeviceRule`].
    ///
    /// `index` is the entry's position in the device list, used to name
    /// entries that have no usable id.
    pub fn resolve(&self, index: usize) -> Result<DeviceRule, DeviceConfigError> {
        let id = self
            .id
            .as_deref()
            .ok_or(DeviceConfigError::MissingField { index, field: "id" })?;
        if id.trim().is_empty() {
            return Err(DeviceConfigError::EmptyId { index });
        }

        let max_unavailability =
            self.max_unavailability
                .as_deref()
                .ok_or(DeviceConfigError::MissingField {
                    index,
                    field: "max_unavailability",
                })?;

        let webhook_url = self
            .webhook_url
            .as_deref()
            .ok_or(DeviceConfigError::MissingField {
                index,
                field: "webhook_url",
            })?;

        let max_unavailability_secs =
            parse_duration(max_unavailability).map_err(|source| {
                DeviceConfigError::InvalidDuration {
                    device_id: id.to_string(),
                    source,
                }
            })?;

        Ok(DeviceRule {
            id: id.to_string(),
            max_unavailability_secs,
            webhook_url: webhook_url.to_string(),
        })
    }

    /// Best label for log lines: the id if present, else the list position
    pub fn label(&self, index: usize) -> String {
        match self.id.as_deref() {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => format!("devices[{index}]"),
        }
    }
}

/// A validated per-device health rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRule {
    /// Syncthing device ID, matched against stats response keys
    pub id: String,
    /// Longest allowed time since the device was last seen
    pub max_unavailability_secs: u64,
    /// URL to GET while the device is healthy
    pub webhook_url: String,
}

/// A device entry that cannot be checked
#[derive(Debug, thiserror::Error)]
pub enum DeviceConfigError {
    #[error("devices[{index}] is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("devices[{index}] has an empty id")]
    EmptyId { index: usize },

    #[error("device {device_id}: {source}")]
    InvalidDuration {
        device_id: String,
        #[source]
        source: ConfigError,
    },
}
