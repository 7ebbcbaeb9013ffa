use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};

use super::model::DeviceStats;

/// Timeout applied to every stats request
pub const STATS_TIMEOUT: Duration = Duration::from_secs(10);

const API_KEY_HEADER: &str = "X-API-Key";

/// Source of per-cycle device statistics
#[async_trait]
pub trait DeviceStatsSource: Send + Sync {
    /// Fetch a fresh snapshot of device statistics
    async fn fetch_device_stats(&self) -> Result<DeviceStats, StatsFetchError>;
}

/// Client for the Syncthing REST API
#[derive(Debug, Clone)]
pub struct SyncthingClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl SyncthingClient {
    /// `base_url` is used as given; [`Config`](crate::config::Config) strips
    /// any trailing slash when the document is loaded.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, StatsFetchError> {
        Self::with_timeout(base_url, api_key, STATS_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, StatsFetchError> {
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|e| StatsFetchError::Client(format!("Invalid API key header: {}", e)))?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| StatsFetchError::Client(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.to_string(),
        })
    }

    /// Full URL of the device statistics endpoint
    pub fn stats_url(&self) -> String {
        format!("{}/rest/stats/device", self.base_url)
    }
}

#[async_trait]
impl DeviceStatsSource for SyncthingClient {
    async fn fetch_device_stats(&self) -> Result<DeviceStats, StatsFetchError> {
        let url = self.stats_url();

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| StatsFetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatsFetchError::Status(status.as_u16()));
        }

        let stats: DeviceStats = response
            .json()
            .await
            .map_err(|e| StatsFetchError::Deserialization(e.to_string()))?;

        tracing::debug!(url = %url, devices = stats.len(), "Fetched device stats");

        Ok(stats)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StatsFetchError {
    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Syncthing returned status {0}")]
    Status(u16),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}
