use std::collections::HashMap;

use serde::Deserialize;

/// Snapshot of `/rest/stats/device`, keyed by device ID
pub type DeviceStats = HashMap<String, DeviceStat>;

/// Per-device statistics as reported by Syncthing
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStat {
    /// ISO-8601 timestamp of the last connection
    #[serde(default)]
    pub last_seen: Option<String>,
    /// Length of the last connection in seconds
    #[serde(default, rename = "lastConnectionDurationS")]
    pub last_connection_duration_s: Option<f64>,
}

impl DeviceStat {
    pub fn seen_at(last_seen: impl Into<String>) -> Self {
        Self {
            last_seen: Some(last_seen.into()),
            last_connection_duration_s: None,
        }
    }

    /// `lastSeen`, or `None` when absent or blank
    pub fn last_seen(&self) -> Option<&str> {
        self.last_seen.as_deref().filter(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_syncthing_response() {
        let body = r#"{
            "AAAA-BBBB": {
                "lastSeen": "2024-01-01T11:00:00.123456789+01:00",
                "lastConnectionDurationS": 812.5
            },
            "CCCC-DDDD": {}
        }"#;
        let stats: DeviceStats = serde_json::from_str(body).unwrap();

        let first = &stats["AAAA-BBBB"];
        assert_eq!(
            first.last_seen(),
            Some("2024-01-01T11:00:00.123456789+01:00")
        );
        assert_eq!(first.last_connection_duration_s, Some(812.5));
        assert_eq!(stats["CCCC-DDDD"].last_seen(), None);
    }

    #[test]
    fn test_blank_last_seen_is_absent() {
        assert_eq!(DeviceStat::seen_at("").last_seen(), None);
    }
}
