//! Startup wiring: environment, config document and HTTP clients.
//!
//! Any error returned from here is fatal; the binary logs it and exits 1.

use crate::config::{Config, ConfigError, EnvSettings, MissingCredentialError};
use crate::health::{HealthChecker, NotificationError, WebhookNotifier};
use crate::syncthing::{StatsFetchError, SyncthingClient};

/// Checker as assembled for the real service
pub type ServiceChecker = HealthChecker<SyncthingClient, WebhookNotifier>;

/// Errors that stop the service before the first cycle
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Credential(#[from] MissingCredentialError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to build Syncthing client: {0}")]
    StatsClient(#[from] StatsFetchError),

    #[error("Failed to build webhook client: {0}")]
    Notifier(#[from] NotificationError),
}

/// Read settings through `lookup` and build the checker.
pub fn startup<F>(lookup: F) -> Result<ServiceChecker, StartupError>
where
    F: Fn(&str) -> Option<String>,
{
    let settings = EnvSettings::from_lookup(lookup)?;
    build_checker(&settings)
}

/// Load the config named by `settings` and build the checker.
pub fn build_checker(settings: &EnvSettings) -> Result<ServiceChecker, StartupError> {
    let config = Config::load(&settings.config_path)?;
    let client = SyncthingClient::new(&config.syncthing.url, &settings.api_key)?;
    let notifier = WebhookNotifier::new()?;

    tracing::debug!(path = %settings.config_path.display(), "Config loaded");

    Ok(HealthChecker::new(config, client, notifier))
}
