// Coordinator behaviour against a wiremock-backed API.
#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use acogo_api::{AcogoClient, TransportConfig};
use acogo_core::{Coordinator, CoreError, GateCoordinator, IoCoordinator, IoSnapshot};

// ── Helpers ─────────────────────────────────────────────────────────

const BASE: &str = "/public/v2";

async fn setup() -> (MockServer, AcogoClient) {
    let server = MockServer::start().await;
    let client = AcogoClient::with_base_url(
        &format!("{}{BASE}", server.uri()),
        &SecretString::from("token"),
        &TransportConfig::default(),
    )
    .unwrap();
    (server, client)
}

fn gate(client: AcogoClient) -> GateCoordinator {
    GateCoordinator::new(client, "g1", Duration::ZERO)
}

fn io(client: AcogoClient) -> IoCoordinator {
    IoCoordinator::new(client, "io1", Duration::ZERO)
}

async fn mount_once(server: &MockServer, verb: &str, route: &str, response: ResponseTemplate) {
    Mock::given(method(verb))
        .and(path(format!("{BASE}{route}")))
        .respond_with(response)
        .up_to_n_times(1)
        .mount(server)
        .await;
}

// ── Gate coordinator ────────────────────────────────────────────────

#[tokio::test]
async fn test_gate_success_replaces_data() {
    let (server, client) = setup().await;
    mount_once(
        &server,
        "GET",
        "/devices/gates/g1",
        ResponseTemplate::new(200).set_body_json(json!({ "state": "closed" })),
    )
    .await;

    let coordinator = gate(client);
    coordinator.refresh().await.unwrap();

    let snap = coordinator.core().snapshot();
    assert_eq!(snap.data.as_deref(), Some(&json!({ "state": "closed" })));
    assert!(!snap.offline);
    assert!(snap.available());
    assert!(snap.updated_at.is_some());
}

#[tokio::test]
async fn test_gate_empty_body_becomes_empty_object() {
    let (server, client) = setup().await;
    mount_once(
        &server,
        "GET",
        "/devices/gates/g1",
        ResponseTemplate::new(200).insert_header("content-type", "application/json"),
    )
    .await;

    let coordinator = gate(client);
    coordinator.refresh().await.unwrap();

    assert_eq!(coordinator.core().data().as_deref(), Some(&json!({})));
}

#[tokio::test]
async fn test_gate_offline_keeps_previous_data() {
    let (server, client) = setup().await;
    mount_once(
        &server,
        "GET",
        "/devices/gates/g1",
        ResponseTemplate::new(200).set_body_json(json!({ "state": "open" })),
    )
    .await;
    mount_once(
        &server,
        "GET",
        "/devices/gates/g1",
        ResponseTemplate::new(408).set_body_string("offline"),
    )
    .await;

    let coordinator = gate(client);
    coordinator.refresh().await.unwrap();

    let err = coordinator.refresh().await.unwrap_err();
    assert!(matches!(err, CoreError::DeviceOffline { ref device_id } if device_id == "g1"));

    let snap = coordinator.core().snapshot();
    assert!(snap.offline);
    assert!(!snap.last_update_success);
    assert!(!snap.available());
    assert_eq!(snap.data.as_deref(), Some(&json!({ "state": "open" })));
}

#[tokio::test]
async fn test_gate_api_error_leaves_offline_flag_alone() {
    let (server, client) = setup().await;
    mount_once(
        &server,
        "GET",
        "/devices/gates/g1",
        ResponseTemplate::new(500).set_body_string("failure"),
    )
    .await;

    let coordinator = gate(client);
    let err = coordinator.refresh().await.unwrap_err();
    assert_eq!(err.status(), Some(500));

    let snap = coordinator.core().snapshot();
    assert!(!snap.offline);
    assert!(!snap.last_update_success);
    assert_eq!(snap.last_error.as_deref(), Some("API error: 500: failure"));
}

#[tokio::test]
async fn test_gate_first_refresh_offline_commits_empty_object() {
    let (server, client) = setup().await;
    mount_once(
        &server,
        "GET",
        "/devices/gates/g1",
        ResponseTemplate::new(408).set_body_string("offline"),
    )
    .await;

    let coordinator = gate(client);
    coordinator.first_refresh().await;

    let snap = coordinator.core().snapshot();
    assert!(snap.offline);
    assert_eq!(snap.data.as_deref(), Some(&json!({})));
    assert!(!snap.available());
}

#[tokio::test]
async fn test_gate_first_refresh_api_error_commits_empty_object() {
    let (server, client) = setup().await;
    mount_once(
        &server,
        "GET",
        "/devices/gates/g1",
        ResponseTemplate::new(500).set_body_string("failure"),
    )
    .await;

    let coordinator = gate(client);
    coordinator.first_refresh().await;

    let snap = coordinator.core().snapshot();
    assert!(snap.offline);
    assert_eq!(snap.data.as_deref(), Some(&json!({})));
    assert!(!snap.available());
}

#[tokio::test]
async fn test_gate_first_refresh_unreachable_cloud_commits_empty_object() {
    let client = AcogoClient::with_base_url(
        "http://127.0.0.1:1/public/v2",
        &SecretString::from("token"),
        &TransportConfig::default(),
    )
    .unwrap();

    let coordinator = gate(client);
    coordinator.first_refresh().await;

    let snap = coordinator.core().snapshot();
    assert!(snap.offline);
    assert_eq!(snap.data.as_deref(), Some(&json!({})));
}

#[tokio::test]
async fn test_gate_open_refused_while_offline() {
    let (server, client) = setup().await;
    mount_once(
        &server,
        "GET",
        "/devices/gates/g1",
        ResponseTemplate::new(408).set_body_string("offline"),
    )
    .await;
    Mock::given(method("POST"))
        .and(path(format!("{BASE}/devices/g1/orders/ez-open")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let coordinator = gate(client);
    coordinator.first_refresh().await;

    let err = coordinator.open().await.unwrap_err();
    assert!(err.is_offline());
}

// ── I/O coordinator ─────────────────────────────────────────────────

#[tokio::test]
async fn test_io_details_fetched_once() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path(format!("{BASE}/devices/io/io1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "out1Name": "Gate" })))
        .expect(1)
        .mount(&server)
        .await;

    let coordinator = io(client);
    let first = coordinator.details().await;
    let second = coordinator.details().await;

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.as_map().get("out1Name"), Some(&json!("Gate")));
}

#[tokio::test]
async fn test_io_details_failure_is_cached_as_empty() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path(format!("{BASE}/devices/io/io1")))
        .respond_with(ResponseTemplate::new(500).set_body_string("failure"))
        .expect(1)
        .mount(&server)
        .await;

    let coordinator = io(client);
    assert!(coordinator.details().await.is_empty());
    assert!(coordinator.details().await.is_empty());
}

#[tokio::test]
async fn test_io_poll_normalizes_state() {
    let (server, client) = setup().await;
    mount_once(
        &server,
        "GET",
        "/io/io1/state",
        ResponseTemplate::new(200).set_body_json(json!({
            "message": { "inputs": { "in1": true }, "outputs": { "out1": false } }
        })),
    )
    .await;

    let coordinator = io(client);
    coordinator.refresh_state().await.unwrap();

    let data = coordinator.core().data().unwrap();
    assert_eq!(data.input(1), Some(true));
    assert_eq!(data.output(1), Some(false));
    assert!(!coordinator.core().is_offline());
}

#[tokio::test]
async fn test_io_offline_after_success_resets_payload() {
    let (server, client) = setup().await;
    mount_once(
        &server,
        "GET",
        "/io/io1/state",
        ResponseTemplate::new(200)
            .set_body_json(json!({ "inputs": { "in1": true }, "outputs": { "out1": true } })),
    )
    .await;
    mount_once(
        &server,
        "GET",
        "/io/io1/state",
        ResponseTemplate::new(408).set_body_string("offline"),
    )
    .await;

    let coordinator = io(client);
    coordinator.refresh_state().await.unwrap();
    assert_eq!(coordinator.core().data().unwrap().output(1), Some(true));

    // Offline is a valid outcome for I/O modules, not a failed cycle.
    coordinator.refresh_state().await.unwrap();

    let snap = coordinator.core().snapshot();
    assert!(snap.offline);
    assert!(snap.last_update_success);
    assert!(!snap.available());
    assert_eq!(snap.data.as_deref(), Some(&IoSnapshot::offline()));
}

#[tokio::test]
async fn test_io_refresh_state_returns_api_errors() {
    let (server, client) = setup().await;
    mount_once(
        &server,
        "GET",
        "/io/io1/state",
        ResponseTemplate::new(503).set_body_string("maintenance"),
    )
    .await;

    let coordinator = io(client);
    let err = coordinator.refresh_state().await.unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert!(!coordinator.core().last_update_success());
    assert!(!coordinator.core().is_offline());
}

#[tokio::test]
async fn test_io_first_refresh_tolerates_failures() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path(format!("{BASE}/devices/io/io1")))
        .respond_with(ResponseTemplate::new(500).set_body_string("failure"))
        .expect(1)
        .mount(&server)
        .await;
    mount_once(
        &server,
        "GET",
        "/io/io1/state",
        ResponseTemplate::new(500).set_body_string("failure"),
    )
    .await;

    let coordinator = io(client);
    coordinator.first_refresh().await;

    let snap = coordinator.core().snapshot();
    assert!(snap.offline);
    assert_eq!(snap.data.as_deref(), Some(&IoSnapshot::offline()));
    assert!(coordinator.details().await.is_empty());
}

#[tokio::test]
async fn test_io_set_output_then_refreshes() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path(format!("{BASE}/io/io1/out/2")))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{BASE}/io/io1/state")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "outputs": { "out2": true } })))
        .expect(1)
        .mount(&server)
        .await;

    let coordinator = io(client);
    coordinator.set_output(2, true).await.unwrap();

    assert_eq!(coordinator.core().data().unwrap().output(2), Some(true));
}

// ── Refresh serialization ───────────────────────────────────────────

#[tokio::test]
async fn test_tick_skips_while_refresh_in_flight() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path(format!("{BASE}/io/io1/state")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let coordinator = Arc::new(io(client));
    let in_flight = {
        let c = Arc::clone(&coordinator);
        tokio::spawn(async move { c.refresh().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(!coordinator.try_refresh().await);
    in_flight.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_explicit_refreshes_queue() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path(format!("{BASE}/io/io1/state")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let coordinator = io(client);
    let (a, b) = futures_util::join!(coordinator.refresh(), coordinator.refresh());
    a.unwrap();
    b.unwrap();
}
