//! Shared test helpers for `faros-core` integration tests.
//!
//! Fixtures for parsed suites and a configuration, plus a scripted
//! [`EventSender`] that records what it was asked to send.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use faros_core::EventSender;
use faros_domain::{
    Config, Defaults, Event, EventPayload, FarosError, LogLevel, Result, Secret, SendOptions,
    TestCase, TestSuite,
};

pub fn config() -> Config {
    Config {
        url: "https://prod.api.faros.ai".into(),
        graph: "default".into(),
        staging_graph: None,
        origin: "faros-cli".into(),
        api_key: Some(Secret::from("test-key")),
        sources: Default::default(),
        defaults: Defaults { concurrency: 2, ..Defaults::default() },
        log_level: LogLevel::Info,
    }
}

pub fn suite(name: &str) -> TestSuite {
    TestSuite {
        name: name.into(),
        status: "passed".into(),
        passed: 1,
        total: 1,
        duration_ms: 100,
        timestamp: Some("2024-05-01T10:00:00Z".into()),
        cases: vec![TestCase {
            name: format!("{name} case"),
            status: "pass".into(),
            ..TestCase::default()
        }],
        ..TestSuite::default()
    }
}

/// Sender that fails every event whose suite name is listed.
#[derive(Default)]
pub struct ScriptedSender {
    failing: HashSet<String>,
    latency: Duration,
    in_flight: AtomicUsize,
    pub peak: AtomicUsize,
    pub sent: Mutex<Vec<(String, SendOptions)>>,
}

impl ScriptedSender {
    pub fn new(failing: &[&str], latency: Duration) -> Self {
        Self {
            failing: failing.iter().map(|s| s.to_string()).collect(),
            latency,
            ..Self::default()
        }
    }
}

fn suite_name(event: &Event) -> String {
    match &event.payload {
        EventPayload::TestExecution(data) => data.test.suite.clone(),
        _ => String::new(),
    }
}

#[async_trait]
impl EventSender for ScriptedSender {
    async fn send_event(&self, graph: &str, event: &Event, options: SendOptions) -> Result<()> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let name = suite_name(event);
        if self.failing.contains(&name) {
            return Err(FarosError::http(500, format!("graph {graph} rejected {name}")));
        }
        self.sent.lock().unwrap().push((name, options));
        Ok(())
    }
}
