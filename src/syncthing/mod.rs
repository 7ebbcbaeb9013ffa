pub mod client;
pub mod model;

pub use client::{DeviceStatsSource, StatsFetchError, SyncthingClient, STATS_TIMEOUT};
pub use model::{DeviceStat, DeviceStats};
