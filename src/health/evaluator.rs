//! Staleness evaluation for a single device.
//!
//! [`evaluate`] is pure: it takes the rule, the cycle's stats snapshot and
//! the current time, and returns a [`HealthResult`]. Logging and
//! notification are left to the caller.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta, Utc};

use crate::config::DeviceRule;
use crate::syncthing::DeviceStats;

/// Outcome of checking one device against its rule
#[derive(Debug, Clone, PartialEq)]
pub enum HealthResult {
    /// Seen within the allowed window
    Healthy { elapsed: TimeDelta },
    /// Last seen longer ago than the allowed window
    Unavailable {
        elapsed: TimeDelta,
        max_unavailability_secs: u64,
    },
    /// No usable data for this device
    Unknown(UnknownReason),
    /// `lastSeen` could not be parsed
    Error(TimestampParseError),
}

impl HealthResult {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthResult::Healthy { .. })
    }
}

/// Why a device's health could not be determined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownReason {
    /// The device ID is not a key of the stats snapshot
    NotInStats,
    /// The device is present but has no `lastSeen`
    NoLastSeen,
}

/// A `lastSeen` value that is not an ISO-8601 timestamp
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid lastSeen timestamp {value:?}: {source}")]
pub struct TimestampParseError {
    pub value: String,
    #[source]
    pub source: chrono::ParseError,
}

/// Decide the health of one device.
///
/// The threshold is compared against whole elapsed seconds and is inclusive.
/// A `lastSeen` in the future yields a negative elapsed time and counts as
/// healthy.
pub fn evaluate(rule: &DeviceRule, stats: &DeviceStats, now: DateTime<Utc>) -> HealthResult {
    let Some(stat) = stats.get(&rule.id) else {
        return HealthResult::Unknown(UnknownReason::NotInStats);
    };

    let Some(raw) = stat.last_seen() else {
        return HealthResult::Unknown(UnknownReason::NoLastSeen);
    };

    let last_seen = match parse_last_seen(raw) {
        Ok(ts) => ts,
        Err(e) => return HealthResult::Error(e),
    };

    let elapsed = now.signed_duration_since(last_seen);
    let max = rule.max_unavailability_secs;

    if within_window(elapsed, max) {
        HealthResult::Healthy { elapsed }
    } else {
        HealthResult::Unavailable {
            elapsed,
            max_unavailability_secs: max,
        }
    }
}

fn within_window(elapsed: TimeDelta, max_unavailability_secs: u64) -> bool {
    let whole_secs = elapsed.num_seconds();
    whole_secs < 0 || (whole_secs as u64) <= max_unavailability_secs
}

/// Parse a `lastSeen` timestamp.
///
/// Accepts RFC 3339 (including a trailing `Z`). A date-time without an
/// offset is read as UTC, not host local time, so on hosts with a non-UTC
/// timezone such values are compared differently than a local-time reading.
pub fn parse_last_seen(raw: &str) -> Result<DateTime<FixedOffset>, TimestampParseError> {
    let raw = raw.trim();
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Ok(ts),
        Err(rfc_err) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc().fixed_offset())
            .map_err(|_| TimestampParseError {
                value: raw.to_string(),
                source: rfc_err,
            }),
    }
}

/// Elapsed time in fractional seconds, for log lines
pub fn elapsed_secs_f64(elapsed: TimeDelta) -> f64 {
    elapsed.num_milliseconds() as f64 / 1000.0
}
