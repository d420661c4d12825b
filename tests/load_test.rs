//! Load testing for the gateway.

use std::time::Instant;

use axum::http::StatusCode;

mod common;

use common::{gateway_config, start_gateway, start_mock_backend, MockReply};

#[tokio::test]
async fn test_concurrent_requests_are_relayed_identically() {
    let raw = r#"{"labels":[{"id":"INBOX","name":"INBOX"},{"id":"UNREAD","name":"UNREAD"}]}"#;
    let backend = start_mock_backend(MockReply::json(200, raw)).await;
    let gateway = std::sync::Arc::new(start_gateway(gateway_config(&backend.url())).await);

    let concurrency = 10;
    let requests_per_task = 20;
    let total_requests = concurrency * requests_per_task;

    let start = Instant::now();
    let mut handles = Vec::new();
    for task in 0..concurrency {
        let gateway = gateway.clone();
        handles.push(tokio::spawn(async move {
            let mut ok = 0;
            for _ in 0..requests_per_task {
                let res = gateway
                    .get_as("/api/mail/labels", &format!("tok-{}", task))
                    .send()
                    .await
                    .unwrap();
                if res.status() == StatusCode::OK && res.bytes().await.unwrap() == raw.as_bytes() {
                    ok += 1;
                }
            }
            ok
        }));
    }

    let mut successes = 0;
    for handle in handles {
        successes += handle.await.unwrap();
    }
    let elapsed = start.elapsed();

    println!(
        "{} requests in {:?} ({:.0} req/s)",
        total_requests,
        elapsed,
        total_requests as f64 / elapsed.as_secs_f64()
    );
    assert_eq!(successes, total_requests);
    assert_eq!(backend.calls(), total_requests);
}
