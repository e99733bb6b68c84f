//! Integration tests for the `acogo` CLI binary.
//!
//! Parsing, help output, completions and error handling run without any
//! server; the remaining tests point `--api-base` at a wiremock cloud.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

const BASE: &str = "/public/v2";

/// Build a [`Command`] for the `acogo` binary with env isolation.
///
/// Clears all `ACOGO_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn acogo_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("acogo");
    cmd.env("HOME", "/tmp/acogo-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/acogo-cli-test-nonexistent")
        .env_remove("ACOGO_PROFILE")
        .env_remove("ACOGO_API_BASE")
        .env_remove("ACOGO_TOKEN")
        .env_remove("ACOGO_OUTPUT")
        .env_remove("ACOGO_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary against `server` off the async runtime.
async fn run_against(server: &MockServer, args: &[&str]) -> std::process::Output {
    let mut cmd = acogo_cmd();
    cmd.env("ACOGO_TOKEN", "test-token")
        .args(["--api-base", &format!("{}{BASE}", server.uri())])
        .args(args);
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

async fn mount_get(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("{BASE}{route}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// A cloud with one gate (`g1`) and one I/O module (`io1`).
async fn cloud() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{BASE}/devices")))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "devId": "g1", "name": "Front gate", "model": "acoGO! P" },
            { "devId": "io1", "name": "Garage", "model": "acoGO! I/O" }
        ])))
        .mount(&server)
        .await;
    mount_get(&server, "/devices/gates/g1", json!({ "state": "closed" })).await;
    mount_get(
        &server,
        "/devices/io/io1",
        json!({ "out1Name": "Relay 1", "out2Name": "Door", "out2Time": 5, "in1Name": "Sensor 1" }),
    )
    .await;
    mount_get(
        &server,
        "/io/io1/state",
        json!({ "inputs": { "in1": true }, "outputs": { "out1": true, "out2": false } }),
    )
    .await;
    server
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = acogo_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    acogo_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("acoGO!")
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("gate"))
            .and(predicate::str::contains("entities"))
            .and(predicate::str::contains("watch")),
    );
}

#[test]
fn test_version_flag() {
    acogo_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("acogo"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    acogo_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    acogo_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = acogo_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_devices_list_without_token() {
    acogo_cmd()
        .args(["devices", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("token").and(predicate::str::contains("profile")));
}

#[test]
fn test_config_show_no_config() {
    // `config show` falls back to the default config when no file exists.
    acogo_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[defaults]"));
}

#[test]
fn test_invalid_output_format() {
    let output = acogo_cmd()
        .args(["--output", "invalid", "devices", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_io_set_rejects_port_out_of_range() {
    acogo_cmd()
        .args(["io", "set", "io1", "5", "on"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("5"));
}

#[test]
fn test_invalid_api_base() {
    acogo_cmd()
        .env("ACOGO_TOKEN", "t")
        .args(["--api-base", "not a url", "devices", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("api-base"));
}

// ── Subcommand help discovery ───────────────────────────────────────

#[test]
fn test_io_subcommands_exist() {
    acogo_cmd().args(["io", "--help"]).assert().success().stdout(
        predicate::str::contains("state")
            .and(predicate::str::contains("details"))
            .and(predicate::str::contains("set")),
    );
}

#[test]
fn test_config_subcommands_exist() {
    acogo_cmd().args(["config", "--help"]).assert().success().stdout(
        predicate::str::contains("init")
            .and(predicate::str::contains("show"))
            .and(predicate::str::contains("set-token"))
            .and(predicate::str::contains("use")),
    );
}

// ── Against a mock cloud ────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_list_plain() {
    let server = cloud().await;
    let output = run_against(&server, &["--output", "plain", "devices", "list"]).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "g1\nio1\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_list_json_keeps_wire_fields() {
    let server = cloud().await;
    let output = run_against(&server, &["-o", "json-compact", "devices", "list"]).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let devices: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(devices[0]["devId"], "g1");
    assert_eq!(devices[1]["model"], "acoGO! I/O");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unauthorized_exits_with_auth_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{BASE}/devices")))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let output = run_against(&server, &["devices", "list"]).await;
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_garbled_device_list_is_an_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{BASE}/devices")))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/json")
                .set_body_string("{not json"),
        )
        .mount(&server)
        .await;

    let output = run_against(&server, &["devices", "list"]).await;
    let text = combined_output(&output);
    assert_eq!(output.status.code(), Some(1), "{text}");
    assert!(text.contains("API error (decode)"), "{text}");
    assert!(!text.contains("Could not reach"), "{text}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_slow_cloud_exits_with_timeout_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{BASE}/devices")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let output = run_against(&server, &["--timeout", "1", "devices", "list"]).await;
    let text = combined_output(&output);
    assert_eq!(output.status.code(), Some(8), "{text}");
    assert!(text.contains("timed out after 1s"), "{text}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_gate_open_sends_order() {
    let server = cloud().await;
    Mock::given(method("POST"))
        .and(path(format!("{BASE}/devices/g1/orders/ez-open")))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(&server, &["--yes", "gate", "open", "g1"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Front gate"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_gate_open_by_name() {
    let server = cloud().await;
    Mock::given(method("POST"))
        .and(path(format!("{BASE}/devices/g1/orders/ez-open")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(&server, &["-y", "-q", "gate", "open", "Front gate"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_gate_open_needs_yes_when_not_interactive() {
    let server = cloud().await;
    Mock::given(method("POST"))
        .and(path(format!("{BASE}/devices/g1/orders/ez-open")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let output = run_against(&server, &["gate", "open", "g1"]).await;
    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("--yes"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_gate_open_unknown_device() {
    let server = cloud().await;
    let output = run_against(&server, &["-y", "gate", "open", "nope"]).await;
    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_gate_commands_reject_io_modules() {
    let server = cloud().await;
    let output = run_against(&server, &["gate", "status", "io1"]).await;
    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("not a gate"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_gate_status_json() {
    let server = cloud().await;
    let output = run_against(&server, &["-o", "json", "gate", "status", "g1"]).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let status: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["device_id"], "g1");
    assert_eq!(status["name"], "Front gate");
    assert_eq!(status["available"], true);
    assert_eq!(status["details"], json!({ "state": "closed" }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_gate_status_offline_device() {
    let server = MockServer::start().await;
    mount_get(
        &server,
        "/devices",
        json!([{ "devId": "g1", "name": "Front gate", "model": "acoGO!" }]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(format!("{BASE}/devices/gates/g1")))
        .respond_with(ResponseTemplate::new(408).set_body_string("offline"))
        .mount(&server)
        .await;

    let output = run_against(&server, &["-o", "json", "gate", "status", "g1"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let status: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["offline"], true);
    assert_eq!(status["available"], false);
    assert_eq!(status["details"], json!({}));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_io_state_plain() {
    let server = cloud().await;
    let output = run_against(&server, &["-o", "plain", "io", "state", "io1"]).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        ["in1=on", "in2=-", "in3=-", "in4=-", "out1=on", "out2=off", "out3=-", "out4=-"]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_io_details_json() {
    let server = cloud().await;
    let output = run_against(&server, &["-o", "json", "io", "details", "io1"]).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let details: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(details["out1Name"], "Relay 1");
    assert_eq!(details["out2Time"], 5);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_io_set_switches_output() {
    let server = cloud().await;
    Mock::given(method("POST"))
        .and(path(format!("{BASE}/io/io1/out/1")))
        .and(body_json(json!({ "state": false })))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(&server, &["io", "set", "io1", "1", "off"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Relay 1 switched off"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_io_set_off_rejected_for_timed_output() {
    let server = cloud().await;
    Mock::given(method("POST"))
        .and(path(format!("{BASE}/io/io1/out/2")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let output = run_against(&server, &["io", "set", "io1", "2", "off"]).await;
    assert_eq!(output.status.code(), Some(6), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_entities_plain_lists_unique_ids() {
    let server = cloud().await;
    let output = run_against(&server, &["-o", "plain", "entities"]).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "g1_ez_open\nio1_out1\nio1_out2\nio1_in_1\n"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_entities_platform_filter_and_states() {
    let server = cloud().await;
    let output = run_against(
        &server,
        &["-o", "json-compact", "entities", "--platform", "cover"],
    )
    .await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let entities: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        entities,
        json!([
            {
                "unique_id": "io1_out1", "platform": "cover", "name": "Relay 1",
                "device": "Garage", "available": true, "state": "open"
            },
            {
                "unique_id": "io1_out2", "platform": "cover", "name": "Door",
                "device": "Garage", "available": true, "state": "closed"
            }
        ])
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_entities_port_filter_all() {
    let server = cloud().await;
    let output = run_against(
        &server,
        &["-o", "plain", "entities", "--platform", "binary-sensor", "--port-filter", "all"],
    )
    .await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "io1_in_1\nio1_in_2\nio1_in_3\nio1_in_4\n"
    );
}
