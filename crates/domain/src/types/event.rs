//! Event envelope sent to the graph events endpoint
//!
//! On the wire an event is
//! `{ "type": "CI" | "CD" | "TestExecution", "version", "origin", "data" }`
//! where the shape of `data` depends on `type`. The payload enum below keeps
//! that coupling in the type system.

use serde::{Deserialize, Serialize};

use super::status::{TestStatus, TestType};
use crate::constants::EVENT_SCHEMA_VERSION;
use crate::errors::{FarosError, Result};
use crate::impl_domain_enum_conversions;

/// Discriminator of an [`Event`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "CI")]
    Ci,
    #[serde(rename = "CD")]
    Cd,
    TestExecution,
}

impl_domain_enum_conversions!(EventType {
    Ci => "CI",
    Cd => "CD",
    TestExecution => "TestExecution",
});

/// Canonical event envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub version: String,
    pub origin: String,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl Event {
    pub fn new(origin: impl Into<String>, payload: EventPayload) -> Self {
        Self { version: EVENT_SCHEMA_VERSION.to_string(), origin: origin.into(), payload }
    }

    pub fn event_type(&self) -> EventType {
        match self.payload {
            EventPayload::Ci(_) => EventType::Ci,
            EventPayload::Cd(_) => EventType::Cd,
            EventPayload::TestExecution(_) => EventType::TestExecution,
        }
    }

    /// Check the minimum-field invariants of the payload.
    ///
    /// # Errors
    /// Returns `FarosError::Validation` describing the missing fields.
    pub fn validate(&self) -> Result<()> {
        match &self.payload {
            EventPayload::Ci(data) => data.validate(),
            EventPayload::Cd(data) => data.validate(),
            EventPayload::TestExecution(_) => Ok(()),
        }
    }
}

/// Type-dependent `data` of an [`Event`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EventPayload {
    #[serde(rename = "CI")]
    Ci(CiData),
    #[serde(rename = "CD")]
    Cd(CdData),
    TestExecution(TestExecutionData),
}

/// Reference to an external object by URI, e.g. `GitHub://org/repo/sha`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UriRef {
    pub uri: String,
}

impl UriRef {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

/// Status category attached to a run or deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCategory {
    pub category: String,
}

/// A CI run or a deployment with optional status and timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,
}

impl Execution {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into(), status: None, started_at: None, ended_at: None }
    }
}

/// Build event payload. Requires `commit` or `run`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<UriRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<UriRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<Execution>,
}

impl CiData {
    fn validate(&self) -> Result<()> {
        if self.commit.is_none() && self.run.is_none() {
            return Err(FarosError::Validation(
                "CI event requires at least one of commit or run".to_string(),
            ));
        }
        Ok(())
    }
}

/// Deployment event payload. Requires `deploy` and `commit` or `artifact`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CdData {
    pub deploy: Execution,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<UriRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<UriRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<Execution>,
}

impl CdData {
    fn validate(&self) -> Result<()> {
        if self.deploy.uri.trim().is_empty() {
            return Err(FarosError::Validation("CD event requires a deploy URI".to_string()));
        }
        if self.commit.is_none() && self.artifact.is_none() {
            return Err(FarosError::Validation(
                "CD event requires at least one of commit or artifact".to_string(),
            ));
        }
        Ok(())
    }
}

/// Test execution payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestExecutionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<UriRef>,
    pub test: TestExecutionRecord,
}

/// Aggregate counts of a suite
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestStats {
    pub success: u64,
    pub failure: u64,
    pub skipped: u64,
    pub unknown: u64,
    pub custom: u64,
    pub total: u64,
}

/// Suite-level test record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestExecutionRecord {
    pub id: String,
    pub suite: String,
    pub source: String,
    #[serde(rename = "type")]
    pub test_type: TestType,
    pub status: TestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_details: Option<String>,
    pub stats: TestStats,
    pub start_time: String,
    pub end_time: String,
    #[serde(rename = "case", default, skip_serializing_if = "Vec::is_empty")]
    pub cases: Vec<TestCaseRecord>,
}

/// Case-level test record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub test_type: TestType,
    pub status: TestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_details: Option<String>,
    #[serde(rename = "step", default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<TestStepRecord>,
}

/// Step-level test record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStepRecord {
    pub id: String,
    pub name: String,
    pub status: TestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_details: Option<String>,
}
