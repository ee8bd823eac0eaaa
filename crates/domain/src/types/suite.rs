//! Parsed test-result input
//!
//! These structures are produced by a test-report parser (JUnit, TestNG,
//! xUnit, Cucumber, Mocha) and consumed by the event normalizer. Statuses are
//! left raw; normalization happens when events are built.

use serde::{Deserialize, Serialize};

/// A named group of test cases with aggregate counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuite {
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub passed: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub skipped: u64,
    #[serde(default)]
    pub total: u64,
    /// Wall-clock duration in milliseconds
    #[serde(default, alias = "duration")]
    pub duration_ms: u64,
    /// Suite start as reported by the test runner (ISO-8601)
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub cases: Vec<TestCase>,
}

impl TestSuite {
    /// Number of case results across the suite.
    pub fn case_count(&self) -> usize {
        self.cases.len()
    }
}

/// One test case
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub failure: Option<String>,
    #[serde(default)]
    pub stack_trace: Option<String>,
    #[serde(default)]
    pub steps: Vec<TestStep>,
}

impl TestCase {
    pub fn status_details(&self) -> Option<String> {
        combine_details(self.failure.as_deref(), self.stack_trace.as_deref())
    }
}

/// One step within a test case (Cucumber-style reports)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStep {
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub failure: Option<String>,
    #[serde(default)]
    pub stack_trace: Option<String>,
}

impl TestStep {
    pub fn status_details(&self) -> Option<String> {
        combine_details(self.failure.as_deref(), self.stack_trace.as_deref())
    }
}

/// `"<failure> : <stack>"` when both exist, otherwise whichever is present.
fn combine_details(failure: Option<&str>, stack_trace: Option<&str>) -> Option<String> {
    match (failure, stack_trace) {
        (Some(f), Some(s)) => Some(format!("{f} : {s}")),
        (Some(f), None) => Some(f.to_string()),
        (None, Some(s)) => Some(s.to_string()),
        (None, None) => None,
    }
}
