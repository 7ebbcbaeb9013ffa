use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Time source for the check loop
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current wall-clock time
    fn now(&self) -> DateTime<Utc>;

    /// Wait for `duration` to pass
    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by tokio's timer
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
