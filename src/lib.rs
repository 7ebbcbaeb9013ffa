//! Syncthing Healthcheck
//!
//! Polls a Syncthing instance's `/rest/stats/device` endpoint on a fixed
//! interval and, for every configured device that has been seen within its
//! allowed window, sends a GET to that device's webhook (for example a
//! dead-man's-switch ping URL). Devices that go quiet simply stop pinging.
//!
//! # Example
//!
//! ```no_run
//! use syncthing_healthcheck::config::Config;
//! use syncthing_healthcheck::health::{HealthChecker, WebhookNotifier};
//! use syncthing_healthcheck::syncthing::SyncthingClient;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let yaml = r#"
//! check_interval: 1h
//! devices:
//!   - id: AAAA-BBBB
//!     max_unavailability: 24h
//!     webhook_url: https://hc-ping.com/uuid
//! "#;
//! let config = Config::from_yaml_str(yaml)?;
//! let client = SyncthingClient::new(&config.syncthing.url, "api-key")?;
//! let checker = HealthChecker::new(config, client, WebhookNotifier::new()?);
//!
//! let report = checker.run_cycle().await;
//! println!("{:?}", report);
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod config;
pub mod health;
pub mod syncthing;

pub use config::{Config, ConfigError, DeviceRule};
pub use health::{HealthChecker, HealthResult};
pub use syncthing::{DeviceStats, SyncthingClient};
