//! API integration tests: HTTP → router → service → discovery → response.
//!
//! Discovery runs for real against shell scripts placed in a temp install root.

#![cfg(unix)]

use metadata_adapter::api::server::{CAPABILITY_HEADER, REQUEST_ID_HEADER};
use metadata_adapter::api::{ApiServer, StatusClient};
use metadata_adapter::fixer::{FixerReport, FixerRequest};
use metadata_adapter::types::ToolConfig;
use metadata_adapter::{AdapterService, ToolStatus};
use pretty_assertions::assert_eq;
use std::net::SocketAddr;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

const EXE: &str = "sd-prompt-reader";

/// Helper: write an executable `/bin/sh` script.
fn write_script(path: &Path, body: &str) {
    std::fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

/// Helper: install root with a bundled tool printing `version`.
fn bundled_root(version: &str) -> (tempfile::TempDir, PathBuf) {
    let root = tempfile::tempdir().unwrap();
    let ext = root.path().join("ext");
    std::fs::create_dir_all(&ext).unwrap();
    let exe = ext.join(EXE);
    write_script(&exe, &format!("echo '{}'", version));
    (root, exe)
}

fn tool_config(root: &Path, exe_name: &str) -> ToolConfig {
    ToolConfig {
        exe_name: exe_name.to_string(),
        install_root: Some(root.to_path_buf()),
        extension_dir: PathBuf::from("ext"),
        probe_timeout: Duration::from_secs(5),
    }
}

/// Helper: serve on a random port, return (base_url, server, task).
async fn start_test_server(
    config: ToolConfig,
) -> (String, Arc<ApiServer>, tokio::task::JoinHandle<()>) {
    let service = Arc::new(AdapterService::from_config(&config));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();

    let server = Arc::new(ApiServer::new(service, addr));
    let serving = server.clone();
    let handle = tokio::spawn(async move {
        let _ = serving.serve_on(listener).await;
    });

    (format!("http://{}", addr), server, handle)
}

fn url(base: &str, method: &str) -> String {
    format!("{}/api/universal_metadata_adapter/{}", base, method)
}

async fn post_json(
    base: &str,
    method: &str,
) -> (reqwest::StatusCode, reqwest::header::HeaderMap, serde_json::Value) {
    let response = reqwest::Client::new()
        .post(url(base, method))
        .send()
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.json().await.unwrap();
    (status, headers, body)
}

#[tokio::test]
async fn test_check_status_finds_bundled_tool() {
    let (root, exe) = bundled_root("1.2.0");
    let (base, _server, _handle) = start_test_server(tool_config(root.path(), EXE)).await;

    let (status, headers, body) = post_json(&base, "check_cli_status").await;
    assert_eq!(status, reqwest::StatusCode::OK);
    assert!(headers.contains_key(REQUEST_ID_HEADER));
    assert!(!headers.contains_key(CAPABILITY_HEADER));
    assert_eq!(body["installed"], true);
    assert_eq!(body["version"], "1.2.0");
    assert_eq!(body["path"], exe.to_str().unwrap());
    assert!(body["last_checked_utc"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_check_status_accepts_get() {
    let (root, _exe) = bundled_root("1.2.0");
    let (base, _server, _handle) = start_test_server(tool_config(root.path(), EXE)).await;

    let response = reqwest::get(url(&base, "check_cli_status")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let status: ToolStatus = response.json().await.unwrap();
    assert_eq!(status.version(), "1.2.0");
}

#[tokio::test]
async fn test_refresh_requires_post() {
    let (root, _exe) = bundled_root("1.2.0");
    let (base, _server, _handle) = start_test_server(tool_config(root.path(), EXE)).await;

    let response = reqwest::get(url(&base, "refresh_cli_status")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_check_is_cached_until_refresh() {
    let (root, exe) = bundled_root("1.2.0");
    let (base, _server, _handle) = start_test_server(tool_config(root.path(), EXE)).await;

    let (_, _, first) = post_json(&base, "check_cli_status").await;
    assert_eq!(first["version"], "1.2.0");

    write_script(&exe, "echo '1.3.0'");

    let (_, _, cached) = post_json(&base, "check_cli_status").await;
    assert_eq!(cached, first);

    let (_, _, refreshed) = post_json(&base, "refresh_cli_status").await;
    assert_eq!(refreshed["version"], "1.3.0");
    let first_status: ToolStatus = serde_json::from_value(first).unwrap();
    let refreshed_status: ToolStatus = serde_json::from_value(refreshed.clone()).unwrap();
    assert!(refreshed_status.last_checked_utc() >= first_status.last_checked_utc());

    let (_, _, after) = post_json(&base, "check_cli_status").await;
    assert_eq!(after, refreshed);
}

#[tokio::test]
async fn test_broken_version_probe_still_installed() {
    let root = tempfile::tempdir().unwrap();
    let ext = root.path().join("ext");
    std::fs::create_dir_all(&ext).unwrap();
    write_script(&ext.join(EXE), "echo 'boom' >&2; exit 1");
    let (base, _server, _handle) = start_test_server(tool_config(root.path(), EXE)).await;

    let (_, _, body) = post_json(&base, "refresh_cli_status").await;
    assert_eq!(body["installed"], true);
    assert_eq!(body["version"], "");
}

#[tokio::test]
async fn test_missing_tool_reports_not_installed() {
    let root = tempfile::tempdir().unwrap();
    let (base, _server, _handle) =
        start_test_server(tool_config(root.path(), "metadata-adapter-missing-tool")).await;

    let (status, _, body) = post_json(&base, "check_cli_status").await;
    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(body["installed"], false);
    assert_eq!(body["version"], "");
    assert_eq!(body["path"], "");
}

#[tokio::test]
async fn test_download_or_update_is_flagged_not_implemented() {
    let (root, _exe) = bundled_root("1.2.0");
    let (base, _server, _handle) = start_test_server(tool_config(root.path(), EXE)).await;

    let (status, headers, body) = post_json(&base, "download_or_update_cli").await;
    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(headers[CAPABILITY_HEADER], "not-implemented");
    assert_eq!(body["installed"], true);
    assert_eq!(body["version"], "1.2.0");
    assert_eq!(body["update"]["performed"], false);
    assert_eq!(body["update"]["code"], "NOT_IMPLEMENTED");
}

#[tokio::test]
async fn test_run_metadata_fixer_returns_zero_counts() {
    let root = tempfile::tempdir().unwrap();
    let (base, _server, _handle) =
        start_test_server(tool_config(root.path(), "metadata-adapter-missing-tool")).await;

    let (status, headers, body) = post_json(&base, "run_metadata_fixer").await;
    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(headers[CAPABILITY_HEADER], "not-implemented");
    assert_eq!(body, serde_json::json!({ "fixed": 0, "errors": 0, "details": [] }));

    let response = reqwest::Client::new()
        .post(url(&base, "run_metadata_fixer"))
        .json(&serde_json::json!({ "images": ["a.png", "b.png"] }))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "fixed": 0, "errors": 0, "details": [] }));
}

#[tokio::test]
async fn test_unknown_method_returns_not_found() {
    let root = tempfile::tempdir().unwrap();
    let (base, _server, _handle) =
        start_test_server(tool_config(root.path(), "metadata-adapter-missing-tool")).await;

    let (status, headers, body) = post_json(&base, "nonexistent").await;
    assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
    assert!(headers.contains_key(REQUEST_ID_HEADER));
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_body_returns_validation_error() {
    let root = tempfile::tempdir().unwrap();
    let (base, _server, _handle) =
        start_test_server(tool_config(root.path(), "metadata-adapter-missing-tool")).await;

    let response = reqwest::Client::new()
        .post(url(&base, "run_metadata_fixer"))
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION");
}

#[tokio::test]
async fn test_status_client_round_trip() {
    let (root, _exe) = bundled_root("2.0.0");
    let (base, _server, _handle) = start_test_server(tool_config(root.path(), EXE)).await;

    let client = StatusClient::new(base, Duration::from_secs(10)).unwrap();
    let checked = client.check().await.unwrap();
    assert!(checked.is_installed());
    assert_eq!(checked.version(), "2.0.0");

    let refreshed = client.refresh().await.unwrap();
    assert!(refreshed.last_checked_utc() >= checked.last_checked_utc());
}

#[tokio::test]
async fn test_status_client_drives_update_and_fixer() {
    let (root, exe) = bundled_root("2.0.0");
    let (base, _server, _handle) = start_test_server(tool_config(root.path(), EXE)).await;
    let client = StatusClient::new(base, Duration::from_secs(10)).unwrap();

    let report = client.download_or_update().await.unwrap();
    assert!(!report.update.performed);
    assert!(report.update.is_not_implemented());
    assert_eq!(report.status.version(), "2.0.0");
    assert_eq!(report.status.path(), exe.to_str().unwrap());

    let fixed = client
        .run_fixer(&FixerRequest {
            images: vec![PathBuf::from("a.png")],
        })
        .await
        .unwrap();
    assert_eq!(fixed, FixerReport::default());
}

#[tokio::test]
async fn test_concurrent_requests_see_complete_snapshots() {
    let (root, exe) = bundled_root("1.0.0");
    let (base, _server, _handle) = start_test_server(tool_config(root.path(), EXE)).await;
    let exe = exe.to_str().unwrap().to_string();

    let mut tasks = Vec::new();
    for i in 0..8 {
        let base = base.clone();
        tasks.push(tokio::spawn(async move {
            let method = if i % 2 == 0 { "refresh_cli_status" } else { "check_cli_status" };
            post_json(&base, method).await.2
        }));
    }
    for task in tasks {
        let body = task.await.unwrap();
        assert_eq!(body["installed"], true);
        assert_eq!(body["version"], "1.0.0");
        assert_eq!(body["path"], exe.as_str());
    }
}

#[tokio::test]
async fn test_shutdown_stops_server() {
    let root = tempfile::tempdir().unwrap();
    let (_base, server, handle) =
        start_test_server(tool_config(root.path(), "metadata-adapter-missing-tool")).await;

    server.shutdown();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop")
        .unwrap();
}

#[tokio::test]
async fn test_warm_up_populates_cache_before_first_request() {
    let (root, _exe) = bundled_root("1.2.0");
    let service = AdapterService::from_config(&tool_config(root.path(), EXE));

    service.start_warm_up().await.unwrap();
    let cached = service.cache().peek().await.unwrap();
    assert_eq!(cached.version(), "1.2.0");
    assert_eq!(service.check_status().await, cached);
}
