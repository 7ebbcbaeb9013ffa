//! The check loop: fetch stats, evaluate every device, notify, sleep.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use super::clock::{Clock, SystemClock};
use super::evaluator::{elapsed_secs_f64, evaluate, HealthResult, UnknownReason};
use super::notifier::{HealthNotifier, NotificationError};
use crate::config::{Config, DeviceConfigError, DeviceEntry, DeviceRule};
use crate::syncthing::{DeviceStats, DeviceStatsSource, StatsFetchError};

/// Periodic device health checker
pub struct HealthChecker<S, N, C = SystemClock> {
    config: Config,
    stats: S,
    notifier: N,
    clock: C,
}

/// What happened in one cycle
#[derive(Debug)]
pub enum CycleReport {
    /// No devices were evaluated
    Skipped(SkipReason),
    /// Every configured device was visited, in order
    Completed { devices: Vec<DeviceReport> },
}

impl CycleReport {
    pub fn devices(&self) -> &[DeviceReport] {
        match self {
            CycleReport::Skipped(_) => &[],
            CycleReport::Completed { devices } => devices,
        }
    }
}

#[derive(Debug)]
pub enum SkipReason {
    FetchFailed(StatsFetchError),
    EmptyStats,
}

/// Per-device result within a cycle
#[derive(Debug)]
pub struct DeviceReport {
    /// Device id, or its list position when the id is unusable
    pub device: String,
    pub outcome: DeviceOutcome,
}

#[derive(Debug)]
pub enum DeviceOutcome {
    /// The config entry could not be resolved; the device was skipped
    Misconfigured(DeviceConfigError),
    Checked {
        result: HealthResult,
        webhook: WebhookOutcome,
    },
}

#[derive(Debug)]
pub enum WebhookOutcome {
    NotSent,
    Sent,
    Failed(NotificationError),
}

impl DeviceReport {
    pub fn result(&self) -> Option<&HealthResult> {
        match &self.outcome {
            DeviceOutcome::Checked { result, .. } => Some(result),
            DeviceOutcome::Misconfigured(_) => None,
        }
    }

    /// Whether a webhook call was attempted for this device
    pub fn webhook_attempted(&self) -> bool {
        matches!(
            self.outcome,
            DeviceOutcome::Checked {
                webhook: WebhookOutcome::Sent | WebhookOutcome::Failed(_),
                ..
            }
        )
    }
}

impl<S, N> HealthChecker<S, N, SystemClock>
where
    S: DeviceStatsSource,
    N: HealthNotifier,
{
    /// Create a checker driven by the system clock
    pub fn new(config: Config, stats: S, notifier: N) -> Self {
        Self::with_clock(config, stats, notifier, SystemClock)
    }
}

impl<S, N, C> HealthChecker<S, N, C>
where
    S: DeviceStatsSource,
    N: HealthNotifier,
    C: Clock,
{
    pub fn with_clock(config: Config, stats: S, notifier: N, clock: C) -> Self {
        Self {
            config,
            stats,
            notifier,
            clock,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stats_source(&self) -> &S {
        &self.stats
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Run check cycles forever. Only process termination stops the loop.
    pub async fn run(&self) {
        tracing::info!(
            interval_secs = self.config.check_interval_secs,
            syncthing_url = %self.config.syncthing.url,
            devices = self.config.devices.len(),
            "Starting Syncthing healthcheck (interval: {}s)",
            self.config.check_interval_secs
        );

        loop {
            self.tick().await;
        }
    }

    /// Run one cycle, then sleep for the check interval.
    ///
    /// A panic inside the cycle is logged and swallowed, and the sleep still
    /// happens. Returns `None` in that case.
    pub async fn tick(&self) -> Option<CycleReport> {
        let report = match AssertUnwindSafe(self.run_cycle()).catch_unwind().await {
            Ok(report) => Some(report),
            Err(panic) => {
                tracing::error!(
                    error = %panic_message(panic.as_ref()),
                    "Error during health check"
                );
                None
            }
        };

        let interval = self.config.check_interval();
        tracing::info!("Sleeping for {}s", interval.as_secs());
        self.clock.sleep(interval).await;

        report
    }

    /// Fetch stats and check every configured device once.
    pub async fn run_cycle(&self) -> CycleReport {
        tracing::info!("Starting device health check");

        let stats = match self.stats.fetch_device_stats().await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch device stats");
                tracing::error!("No device stats available, skipping check");
                return CycleReport::Skipped(SkipReason::FetchFailed(e));
            }
        };

        if stats.is_empty() {
            tracing::error!("No device stats available, skipping check");
            return CycleReport::Skipped(SkipReason::EmptyStats);
        }

        let mut devices = Vec::with_capacity(self.config.devices.len());
        for (index, entry) in self.config.devices.iter().enumerate() {
            devices.push(self.check_device(index, entry, &stats).await);
        }

        tracing::info!(devices = devices.len(), "Device health check completed");

        CycleReport::Completed { devices }
    }

    async fn check_device(
        &self,
        index: usize,
        entry: &DeviceEntry,
        stats: &DeviceStats,
    ) -> DeviceReport {
        let rule = match entry.resolve(index) {
            Ok(rule) => rule,
            Err(e) => {
                tracing::error!(
                    device = %entry.label(index),
                    error = %e,
                    "Skipping misconfigured device"
                );
                return DeviceReport {
                    device: entry.label(index),
                    outcome: DeviceOutcome::Misconfigured(e),
                };
            }
        };

        let result = evaluate(&rule, stats, self.clock.now());
        log_result(&rule, &result, stats);

        let webhook = if result.is_healthy() {
            self.send_webhook(&rule).await
        } else {
            WebhookOutcome::NotSent
        };

        DeviceReport {
            device: rule.id,
            outcome: DeviceOutcome::Checked { result, webhook },
        }
    }

    async fn send_webhook(&self, rule: &DeviceRule) -> WebhookOutcome {
        match self.notifier.notify(&rule.webhook_url, &rule.id).await {
            Ok(()) => {
                tracing::info!(
                    device_id = %rule.id,
                    "Webhook sent successfully for device {}",
                    rule.id
                );
                WebhookOutcome::Sent
            }
            Err(e) => {
                tracing::error!(
                    device_id = %rule.id,
                    error = %e,
                    "Failed to send webhook for device {}",
                    rule.id
                );
                WebhookOutcome::Failed(e)
            }
        }
    }
}

fn log_result(rule: &DeviceRule, result: &HealthResult, stats: &DeviceStats) {
    let device_id = &rule.id;

    if let Some(duration) = stats.get(device_id).and_then(|s| s.last_connection_duration_s) {
        tracing::debug!(device_id = %device_id, last_connection_secs = duration, "Last connection duration");
    }

    match result {
        HealthResult::Healthy { elapsed } => {
            let elapsed_secs = elapsed_secs_f64(*elapsed);
            tracing::info!(
                device_id = %device_id,
                elapsed_secs,
                "Device {} is healthy (last seen {:.0}s ago)",
                device_id,
                elapsed_secs
            );
        }
        HealthResult::Unavailable {
            elapsed,
            max_unavailability_secs,
        } => {
            let elapsed_secs = elapsed_secs_f64(*elapsed);
            tracing::warn!(
                device_id = %device_id,
                elapsed_secs,
                max_unavailability_secs,
                "Device {} is unavailable (last seen {:.0}s ago, max: {}s)",
                device_id,
                elapsed_secs,
                max_unavailability_secs
            );
        }
        HealthResult::Unknown(UnknownReason::NotInStats) => {
            tracing::warn!(device_id = %device_id, "Device {} not found in stats", device_id);
        }
        HealthResult::Unknown(UnknownReason::NoLastSeen) => {
            tracing::warn!(
                device_id = %device_id,
                "Device {} has no lastSeen timestamp",
                device_id
            );
        }
        HealthResult::Error(e) => {
            tracing::error!(
                device_id = %device_id,
                error = %e,
                "Error checking device {}",
                device_id
            );
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
