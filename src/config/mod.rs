//! Service configuration
//!
//! The YAML document is parsed once at startup into a [`Config`]. Device
//! entries stay loosely typed until they are checked; see
//! [`DeviceEntry::resolve`].

pub mod duration;
pub mod env;
pub mod model;

use std::path::PathBuf;

pub use duration::parse_duration;
pub use env::{EnvSettings, MissingCredentialError};
pub use model::{Config, DeviceConfigError, DeviceEntry, DeviceRule, SyncthingConfig};

/// Configuration errors. Fatal when raised at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config document: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid duration format: {0}")]
    InvalidDuration(String),
}
