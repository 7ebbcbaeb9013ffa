//! Device health checking
//!
//! Each cycle fetches one stats snapshot, evaluates every configured device
//! against its staleness window and pings the device's webhook when it is
//! healthy.

pub mod checker;
pub mod clock;
pub mod evaluator;
pub mod notifier;

pub use checker::{
    CycleReport, DeviceOutcome, DeviceReport, HealthChecker, SkipReason, WebhookOutcome,
};
pub use clock::{Clock, SystemClock};
pub use evaluator::{evaluate, parse_last_seen, HealthResult, TimestampParseError, UnknownReason};
pub use notifier::{HealthNotifier, NotificationError, WebhookNotifier, WEBHOOK_TIMEOUT};
