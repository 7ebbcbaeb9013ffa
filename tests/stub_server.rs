//! End-to-end cycles against an in-process stub of Syncthing and webhook targets.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::{json, Value};

use syncthing_healthcheck::config::Config;
use syncthing_healthcheck::health::{
    Clock, CycleReport, DeviceOutcome, HealthChecker, HealthResult, SkipReason, WebhookNotifier,
    WebhookOutcome,
};
use syncthing_healthcheck::syncthing::{StatsFetchError, SyncthingClient};

const API_KEY: &str = "test-key";

struct StubState {
    stats: Value,
    hook_hits: Mutex<Vec<String>>,
}

async fn device_stats(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    match headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        Some(API_KEY) => Ok(Json(state.stats.clone())),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn hook(State(state): State<Arc<StubState>>, Path(name): Path<String>) -> StatusCode {
    state.hook_hits.lock().push(name.clone());
    if name == "broken" {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    }
}

async fn start_stub(stats: Value) -> (SocketAddr, Arc<StubState>) {
    let state = Arc::new(StubState {
        stats,
        hook_hits: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/rest/stats/device", get(device_stats))
        .route("/hooks/:name", get(hook))
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

struct FixedClock(DateTime<Utc>);

#[async_trait]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }

    async fn sleep(&self, _duration: Duration) {}
}

fn noon() -> FixedClock {
    FixedClock(
        DateTime::parse_from_rfc3339("2024-01-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc),
    )
}

fn config_for(addr: SocketAddr) -> Config {
    let yaml = format!(
        r#"
check_interval: 5m
syncthing:
  url: http://{addr}/
devices:
  - id: laptop
    max_unavailability: 1h
    webhook_url: http://{addr}/hooks/laptop
  - id: nas
    max_unavailability: 30m
    webhook_url: http://{addr}/hooks/nas
  - id: phone
    max_unavailability: 2h
    webhook_url: http://{addr}/hooks/broken
  - id: ghost
    max_unavailability: 1h
    webhook_url: http://{addr}/hooks/ghost
"#
    );
    Config::from_yaml_str(&yaml).unwrap()
}

fn sample_stats() -> Value {
    json!({
        "laptop": { "lastSeen": "2024-01-01T11:45:00Z", "lastConnectionDurationS": 120.0 },
        "nas": { "lastSeen": "2024-01-01T10:00:00+00:00" },
        "phone": { "lastSeen": "2024-01-01T12:30:00.5+01:00" },
        "tablet": { "lastSeen": "2024-01-01T11:59:59Z" }
    })
}

#[tokio::test]
async fn test_cycle_pings_only_healthy_devices() {
    let (addr, stub) = start_stub(sample_stats()).await;
    let config = config_for(addr);
    let client = SyncthingClient::new(&config.syncthing.url, API_KEY).unwrap();
    let checker =
        HealthChecker::with_clock(config, client, WebhookNotifier::new().unwrap(), noon());

    let report = checker.run_cycle().await;
    let devices = report.devices();
    assert_eq!(devices.len(), 4);

    // laptop: 15 minutes ago, inside 1h
    assert!(matches!(
        devices[0].outcome,
        DeviceOutcome::Checked {
            result: HealthResult::Healthy { .. },
            webhook: WebhookOutcome::Sent,
        }
    ));
    // nas: 2 hours ago, outside 30m
    assert!(matches!(
        devices[1].outcome,
        DeviceOutcome::Checked {
            result: HealthResult::Unavailable { .. },
            webhook: WebhookOutcome::NotSent,
        }
    ));
    // phone: healthy, but its webhook answers 500
    assert!(matches!(
        devices[2].outcome,
        DeviceOutcome::Checked {
            result: HealthResult::Healthy { .. },
            webhook: WebhookOutcome::Failed(_),
        }
    ));
    // ghost: not in the snapshot
    assert!(matches!(
        devices[3].outcome,
        DeviceOutcome::Checked {
            result: HealthResult::Unknown(_),
            webhook: WebhookOutcome::NotSent,
        }
    ));

    assert_eq!(
        *stub.hook_hits.lock(),
        vec!["laptop".to_string(), "broken".to_string()]
    );
}

#[tokio::test]
async fn test_wrong_api_key_skips_cycle() {
    let (addr, stub) = start_stub(sample_stats()).await;
    let config = config_for(addr);
    let client = SyncthingClient::new(&config.syncthing.url, "wrong-key").unwrap();
    let checker =
        HealthChecker::with_clock(config, client, WebhookNotifier::new().unwrap(), noon());

    let report = checker.run_cycle().await;

    assert!(matches!(
        report,
        CycleReport::Skipped(SkipReason::FetchFailed(StatsFetchError::Status(401)))
    ));
    assert!(stub.hook_hits.lock().is_empty());
}

#[tokio::test]
async fn test_empty_snapshot_skips_cycle() {
    let (addr, stub) = start_stub(json!({})).await;
    let config = config_for(addr);
    let client = SyncthingClient::new(&config.syncthing.url, API_KEY).unwrap();
    let checker =
        HealthChecker::with_clock(config, client, WebhookNotifier::new().unwrap(), noon());

    let report = checker.tick().await.unwrap();

    assert!(matches!(report, CycleReport::Skipped(SkipReason::EmptyStats)));
    assert!(stub.hook_hits.lock().is_empty());
}

#[tokio::test]
async fn test_non_object_body_is_a_fetch_error() {
    let (addr, _stub) = start_stub(json!(["not", "a", "map"])).await;
    let client = SyncthingClient::new(&format!("http://{addr}"), API_KEY).unwrap();
    let checker = HealthChecker::with_clock(
        Config::new(60),
        client,
        WebhookNotifier::new().unwrap(),
        noon(),
    );

    let report = checker.run_cycle().await;

    assert!(matches!(
        report,
        CycleReport::Skipped(SkipReason::FetchFailed(StatsFetchError::Deserialization(_)))
    ));
}
