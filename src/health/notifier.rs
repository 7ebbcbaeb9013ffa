//! Webhook notifications for healthy devices

use std::time::Duration;

use async_trait::async_trait;

/// Timeout applied to every webhook call
pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Sink for "device is healthy" notifications
#[async_trait]
pub trait HealthNotifier: Send + Sync {
    /// Notify `webhook_url` that `device_id` is healthy. Called at most once
    /// per device per cycle; implementations must not retry.
    async fn notify(&self, webhook_url: &str, device_id: &str) -> Result<(), NotificationError>;
}

/// Notifier that issues a plain GET to the device's webhook URL
pub struct WebhookNotifier {
    client: reqwest::Client,
}

impl WebhookNotifier {
    /// Create a new notifier
    pub fn new() -> Result<Self, NotificationError> {
        Self::with_timeout(WEBHOOK_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotificationError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HealthNotifier for WebhookNotifier {
    async fn notify(&self, webhook_url: &str, device_id: &str) -> Result<(), NotificationError> {
        let response = self
            .client
            .get(webhook_url)
            .send()
            .await
            .map_err(|e| NotificationError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotificationError::Status(response.status().as_u16()));
        }

        tracing::debug!(
            device_id = %device_id,
            url = %webhook_url,
            "Webhook responded"
        );

        Ok(())
    }
}

/// Notifier errors
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("Failed to send webhook: {0}")]
    Network(String),

    #[error("Webhook returned status {0}")]
    Status(u16),
}
