//! Domain types and models

pub mod event;
pub mod status;
pub mod suite;
pub mod upload;

pub use event::{
    CdData, CiData, Event, EventPayload, EventType, Execution, StatusCategory, TestCaseRecord,
    TestExecutionData, TestExecutionRecord, TestStats, TestStepRecord, UriRef,
};
pub use status::{TestStatus, TestType};
pub use suite::{TestCase, TestStep, TestSuite};
pub use upload::{
    SendOptions, TaskState, UploadFailure, UploadProgress, UploadResult, UploadTask,
};
