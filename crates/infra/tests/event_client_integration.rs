//! Integration tests for the events API client against a mock server
//!
//! Covers the retry policy (429 and 503 are retried, other statuses are not),
//! the wire request shape and configuration failures.

use std::collections::BTreeMap;
use std::net::TcpListener;
use std::time::Duration;

use faros_domain::{
    CdData, Config, Defaults, Event, EventPayload, Execution, FarosError, LogLevel, Secret,
    SendOptions, StatusCategory, UriRef,
};
use faros_infra::{create_client, EventClient};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(url: &str) -> Config {
    Config {
        url: url.to_string(),
        graph: "default".to_string(),
        staging_graph: None,
        origin: "faros-cli".to_string(),
        api_key: Some(Secret::from("test-api-key")),
        sources: BTreeMap::new(),
        defaults: Defaults::default(),
        log_level: LogLevel::Info,
    }
}

fn client(server: &MockServer) -> EventClient {
    EventClient::builder(&config(&server.uri()))
        .base_backoff(Duration::from_millis(5))
        .build()
        .expect("client")
}

fn cd_event() -> Event {
    let mut deploy = Execution::new("Spinnaker://app/prod/deploy-1");
    deploy.status = Some(StatusCategory { category: "Success".into() });
    Event::new(
        "faros-cli",
        EventPayload::Cd(CdData {
            deploy,
            commit: Some(UriRef::new("GitHub://org/repo/abc123")),
            artifact: None,
            run: None,
        }),
    )
}

#[tokio::test]
async fn test_rate_limited_then_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .send_event("default", &cd_event(), SendOptions::default())
        .await
        .expect("third attempt succeeds");

    assert_eq!(server.received_requests().await.expect("recorded").len(), 3);
}

#[tokio::test]
async fn test_bad_request_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("missing deploy uri"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .send_event("default", &cd_event(), SendOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err, FarosError::http(400, "missing deploy uri"));
}

#[tokio::test]
async fn test_unavailable_exhausts_three_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(3)
        .mount(&server)
        .await;

    let err = client(&server)
        .send_event("default", &cd_event(), SendOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert!(err.to_string().contains("maintenance"));
}

#[tokio::test]
async fn test_request_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphs/team-graph/events"))
        .and(query_param("full", "true"))
        .and(query_param("validateOnly", "true"))
        .and(header("authorization", "test-api-key"))
        .and(body_partial_json(json!({
            "type": "CD",
            "version": "0.0.1",
            "origin": "faros-cli",
            "data": { "deploy": { "uri": "Spinnaker://app/prod/deploy-1" } }
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .send_event("team-graph", &cd_event(), SendOptions::validate_only())
        .await
        .expect("accepted");

    let requests = server.received_requests().await.expect("recorded");
    let agent = requests[0].headers.get("user-agent").expect("user agent").to_str().expect("ascii");
    assert!(agent.starts_with("faros-sync/"));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let uri = format!("http://{}", listener.local_addr().expect("addr"));
    drop(listener); // nothing listens on the port any more

    let client = EventClient::builder(&config(&uri))
        .base_backoff(Duration::from_millis(1))
        .build()
        .expect("client");
    let err = client.send_event("default", &cd_event(), SendOptions::default()).await.unwrap_err();

    assert!(matches!(err, FarosError::Network(_)), "got {err:?}");
    assert!(err.is_retryable());
}

#[test]
fn test_missing_api_key_fails_before_network() {
    let mut config = config("https://prod.api.faros.ai");
    config.api_key = None;

    let err = create_client(&config).unwrap_err();
    assert!(matches!(err, FarosError::Config(_)));
}
