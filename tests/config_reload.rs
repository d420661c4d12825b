//! Hot reload end to end: file on disk → watcher → running gateway.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use companion_gateway::config::{load_config, watcher::ConfigWatcher};
use serde_json::Value;

mod common;

use common::{start_gateway_with_updates, start_mock_backend, MockReply, TestGateway};

fn write_config(path: &Path, backend_url: &str, cookie_name: &str) {
    let content = format!(
        "[upstream]\nbase_url = \"{}\"\nuse_system_proxy = false\n\n[session]\ncookie_name = \"{}\"\n",
        backend_url, cookie_name
    );
    fs::write(path, content).unwrap();
}

async fn cookie_name(gateway: &TestGateway) -> String {
    let body: Value = gateway.get("/api/_dev").send().await.unwrap().json().await.unwrap();
    body["environment"]["cookie_name"].as_str().unwrap().to_string()
}

async fn wait_for_cookie_name(gateway: &TestGateway, expected: &str) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let current = cookie_name(gateway).await;
        if current == expected {
            return;
        }
        assert!(Instant::now() < deadline, "still serving cookie '{}', wanted '{}'", current, expected);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

#[tokio::test]
async fn test_file_edits_reach_the_running_gateway() {
    let backend = start_mock_backend(MockReply::json(200, r#"{"labels":[]}"#)).await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gateway.toml");
    write_config(&path, &backend.url(), "a_jwt");

    let config = load_config(&path).unwrap();
    let (watcher, updates) = ConfigWatcher::new(&path);
    let _watcher = watcher.run().unwrap();
    let gateway = start_gateway_with_updates(config, updates).await;
    assert_eq!(cookie_name(&gateway).await, "a_jwt");

    write_config(&path, &backend.url(), "b_jwt");
    wait_for_cookie_name(&gateway, "b_jwt").await;

    // Rejected by validation: the running state stays as it was.
    write_config(&path, &backend.url(), "bad name;");
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(cookie_name(&gateway).await, "b_jwt");

    let staged = dir.path().join("gateway.toml.swp");
    write_config(&staged, &backend.url(), "c_jwt");
    fs::rename(&staged, &path).unwrap();
    wait_for_cookie_name(&gateway, "c_jwt").await;

    let res = gateway
        .get("/api/mail/labels")
        .header("cookie", "c_jwt=tok")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(backend.last().header("authorization"), Some("Bearer tok"));

    let res = gateway
        .get("/api/mail/labels")
        .header("cookie", "a_jwt=tok")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
