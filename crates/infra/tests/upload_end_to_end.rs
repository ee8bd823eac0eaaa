//! End-to-end batch upload: parsed suites through the normalizer, the
//! coordinator and the real client against a mock events endpoint.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use faros_common::observability::Logger;
use faros_core::{build_upload_tasks, TestExecutionOptions, UploadCoordinator};
use faros_domain::{Config, Defaults, LogLevel, Secret, TestCase, TestSuite, UploadProgress};
use faros_infra::EventClient;
use serde_json::json;
use tokio::sync::watch;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(url: &str) -> Config {
    Config {
        url: url.to_string(),
        graph: "default".to_string(),
        staging_graph: None,
        origin: "faros-cli".to_string(),
        api_key: Some(Secret::from("test-api-key")),
        sources: BTreeMap::new(),
        defaults: Defaults { concurrency: 2, ..Defaults::default() },
        log_level: LogLevel::Info,
    }
}

fn suite(name: &str) -> TestSuite {
    TestSuite {
        name: name.into(),
        status: "passed".into(),
        passed: 1,
        total: 1,
        duration_ms: 250,
        timestamp: Some("2024-05-01T10:00:00Z".into()),
        cases: vec![TestCase {
            name: format!("{name} works"),
            status: "pass".into(),
            ..TestCase::default()
        }],
        ..TestSuite::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_partial_failure_is_reported_per_suite() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphs/default/events"))
        .and(body_partial_json(json!({ "data": { "test": { "suite": "B" } } })))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid suite"))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphs/default/events"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let config = config(&server.uri());
    let client = EventClient::builder(&config)
        .base_backoff(Duration::from_millis(5))
        .build()
        .expect("client");

    let suites = vec![suite("A"), suite("B"), suite("C")];
    let tasks = build_upload_tasks(&suites, &TestExecutionOptions::default(), &config);

    let (progress_tx, progress_rx) = watch::channel(UploadProgress::default());
    let coordinator = UploadCoordinator::new(Arc::new(client), Logger::silent())
        .with_concurrency(config.defaults.concurrency)
        .with_progress(progress_tx);

    let result = coordinator.upload_batch(&config.graph, tasks).await;

    assert_eq!(result.uploaded_count, 2);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].identity, "B");
    assert_eq!(result.errors[0].error_message, "HTTP 400: invalid suite");

    let progress = *progress_rx.borrow();
    assert!(progress.is_complete());
    assert_eq!(progress.succeeded, 2);
    assert_eq!(progress.failed, 1);
}

#[tokio::test]
async fn test_transient_failures_recover_inside_a_batch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).mount(&server).await;

    let config = config(&server.uri());
    let client = EventClient::builder(&config)
        .base_backoff(Duration::from_millis(5))
        .build()
        .expect("client");
    let tasks = build_upload_tasks(&[suite("only")], &TestExecutionOptions::default(), &config);

    let result = UploadCoordinator::new(Arc::new(client), Logger::silent())
        .upload_batch("default", tasks)
        .await;

    assert_eq!(result.uploaded_count, 1);
    assert!(result.is_success());
    assert_eq!(server.received_requests().await.expect("recorded").len(), 2);
}
