//! TestExecution event construction from parsed suites

use faros_domain::constants::DEFAULT_TEST_SOURCE;
use faros_domain::{
    Config, Event, EventPayload, TestCase, TestCaseRecord, TestExecutionData, TestExecutionRecord,
    TestStats, TestStep, TestStepRecord, TestSuite, TestType, UploadTask, UriRef,
};
use serde::Serialize;
use uuid::Uuid;

use super::normalize::{normalize_status, normalize_time, offset_time};

/// Per-invocation options for test result uploads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestExecutionOptions {
    pub source: Option<String>,
    pub test_type: Option<TestType>,
    pub commit: Option<String>,
    /// Used when the suite carries no timestamp. Defaults to `"now"`.
    pub test_start: Option<String>,
    pub test_end: Option<String>,
}

/// Builds `TestExecution` events for suites sharing one set of options.
#[derive(Debug, Clone)]
pub struct TestExecutionEventBuilder<'a> {
    options: &'a TestExecutionOptions,
    config: &'a Config,
}

impl<'a> TestExecutionEventBuilder<'a> {
    pub fn new(options: &'a TestExecutionOptions, config: &'a Config) -> Self {
        Self { options, config }
    }

    fn source(&self) -> String {
        self.options
            .source
            .clone()
            .or_else(|| self.config.defaults.test_source.clone())
            .unwrap_or_else(|| DEFAULT_TEST_SOURCE.to_string())
    }

    fn test_type(&self) -> TestType {
        self.options.test_type.or(self.config.defaults.test_type).unwrap_or_default()
    }

    /// The suite's own timestamp wins. One that does not parse is still kept
    /// as the start; the end then falls back to the options.
    fn window(&self, suite: &TestSuite) -> (String, String) {
        if let Some(timestamp) = suite.timestamp.as_deref().filter(|ts| !ts.trim().is_empty()) {
            let end = offset_time(timestamp, suite.duration_ms).unwrap_or_else(|| {
                normalize_time(self.options.test_end.as_deref().unwrap_or("now"))
            });
            return (timestamp.to_string(), end);
        }
        let start = self.options.test_start.as_deref().unwrap_or("now");
        let end = self.options.test_end.as_deref().unwrap_or("now");
        (normalize_time(start), normalize_time(end))
    }

    /// Every record in the event gets a fresh identifier.
    pub fn build(&self, suite: &TestSuite) -> Event {
        let test_type = self.test_type();
        let (start_time, end_time) = self.window(suite);

        let record = TestExecutionRecord {
            id: new_id(),
            suite: suite.name.clone(),
            source: self.source(),
            test_type,
            status: normalize_status(&suite.status),
            status_details: Some(suite.status.clone()),
            stats: TestStats {
                success: suite.passed,
                failure: suite.failed,
                skipped: suite.skipped,
                unknown: 0,
                custom: 0,
                total: suite.total,
            },
            start_time,
            end_time,
            cases: suite.cases.iter().map(|case| case_record(case, test_type)).collect(),
        };

        let data = TestExecutionData {
            commit: self
                .options
                .commit
                .as_deref()
                .filter(|c| !c.is_empty())
                .map(UriRef::new),
            test: record,
        };

        Event::new(self.config.origin.clone(), EventPayload::TestExecution(data))
    }
}

fn case_record(case: &TestCase, test_type: TestType) -> TestCaseRecord {
    TestCaseRecord {
        id: new_id(),
        name: case.name.clone(),
        test_type,
        status: normalize_status(&case.status),
        status_details: case.status_details(),
        steps: case.steps.iter().map(step_record).collect(),
    }
}

fn step_record(step: &TestStep) -> TestStepRecord {
    TestStepRecord {
        id: new_id(),
        name: step.name.clone(),
        status: normalize_status(&step.status),
        status_details: step.status_details(),
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Build the `TestExecution` event for one suite.
pub fn build_test_execution_event(
    suite: &TestSuite,
    options: &TestExecutionOptions,
    config: &Config,
) -> Event {
    TestExecutionEventBuilder::new(options, config).build(suite)
}

/// One upload task per suite, identified by suite name.
pub fn build_upload_tasks(
    suites: &[TestSuite],
    options: &TestExecutionOptions,
    config: &Config,
) -> Vec<UploadTask> {
    let builder = TestExecutionEventBuilder::new(options, config);
    suites.iter().map(|suite| UploadTask::new(suite.name.clone(), builder.build(suite))).collect()
}

/// Record counts a sync of these suites would create
///
/// Serializes as the dry-run summary object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuitePlanSummary {
    pub test_executions: usize,
    pub test_cases: u64,
    pub test_case_results: u64,
}

impl SuitePlanSummary {
    pub fn from_suites(suites: &[TestSuite]) -> Self {
        let cases: u64 =
            suites.iter().map(|suite| suite.total.max(suite.case_count() as u64)).sum();
        Self { test_executions: suites.len(), test_cases: cases, test_case_results: cases }
    }
}
