//! CI and CD event builders
//!
//! Optional sub-objects are attached only when supplied. `build()` checks the
//! minimum-field invariants so an invalid event never reaches the network.

use faros_domain::{
    CdData, CiData, Event, EventPayload, Execution, FarosError, Result, StatusCategory, UriRef,
};

use super::normalize::normalize_time;

/// Caller-supplied CI/CD fields, as collected by the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CicdOptions {
    /// Generic status; used when the specific run/deploy status is absent.
    pub status: Option<String>,
    pub commit: Option<String>,
    pub artifact: Option<String>,
    pub run: Option<String>,
    pub run_status: Option<String>,
    pub run_start_time: Option<String>,
    pub run_end_time: Option<String>,
    pub deploy: Option<String>,
    pub deploy_status: Option<String>,
    pub deploy_start_time: Option<String>,
    pub deploy_end_time: Option<String>,
}

impl CicdOptions {
    fn run_execution(&self) -> Option<Execution> {
        let uri = non_empty(self.run.as_deref())?;
        Some(execution(
            uri,
            self.run_status.as_deref().or(self.status.as_deref()),
            self.run_start_time.as_deref(),
            self.run_end_time.as_deref(),
        ))
    }

    fn deploy_execution(&self) -> Option<Execution> {
        let uri = non_empty(self.deploy.as_deref())?;
        Some(execution(
            uri,
            self.deploy_status.as_deref().or(self.status.as_deref()),
            self.deploy_start_time.as_deref(),
            self.deploy_end_time.as_deref(),
        ))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn execution(uri: &str, status: Option<&str>, start: Option<&str>, end: Option<&str>) -> Execution {
    Execution {
        uri: uri.to_string(),
        status: non_empty(status).map(|category| StatusCategory { category: category.to_string() }),
        started_at: non_empty(start).map(normalize_time),
        ended_at: non_empty(end).map(normalize_time),
    }
}

/// Builder for `CI` events
#[derive(Debug, Clone)]
pub struct CiEventBuilder {
    origin: String,
    data: CiData,
}

impl CiEventBuilder {
    pub fn new(origin: impl Into<String>) -> Self {
        Self { origin: origin.into(), data: CiData::default() }
    }

    pub fn commit(mut self, uri: impl Into<String>) -> Self {
        self.data.commit = Some(UriRef::new(uri));
        self
    }

    pub fn artifact(mut self, uri: impl Into<String>) -> Self {
        self.data.artifact = Some(UriRef::new(uri));
        self
    }

    pub fn run(mut self, run: Execution) -> Self {
        self.data.run = Some(run);
        self
    }

    /// # Errors
    /// `FarosError::Validation` when neither commit nor run is set.
    pub fn build(self) -> Result<Event> {
        let event = Event::new(self.origin, EventPayload::Ci(self.data));
        event.validate()?;
        Ok(event)
    }
}

/// Builder for `CD` events
#[derive(Debug, Clone)]
pub struct CdEventBuilder {
    origin: String,
    deploy: Option<Execution>,
    commit: Option<UriRef>,
    artifact: Option<UriRef>,
    run: Option<Execution>,
}

impl CdEventBuilder {
    pub fn new(origin: impl Into<String>) -> Self {
        Self { origin: origin.into(), deploy: None, commit: None, artifact: None, run: None }
    }

    pub fn deploy(mut self, deploy: Execution) -> Self {
        self.deploy = Some(deploy);
        self
    }

    pub fn commit(mut self, uri: impl Into<String>) -> Self {
        self.commit = Some(UriRef::new(uri));
        self
    }

    pub fn artifact(mut self, uri: impl Into<String>) -> Self {
        self.artifact = Some(UriRef::new(uri));
        self
    }

    pub fn run(mut self, run: Execution) -> Self {
        self.run = Some(run);
        self
    }

    /// The commit is attached in preference to the artifact when both are set.
    ///
    /// # Errors
    /// `FarosError::Validation` when deploy is missing, or when neither commit
    /// nor artifact is set.
    pub fn build(self) -> Result<Event> {
        let deploy = self.deploy.ok_or_else(|| {
            FarosError::Validation("CD event requires a deploy URI".to_string())
        })?;
        let (commit, artifact) = match (self.commit, self.artifact) {
            (Some(commit), _) => (Some(commit), None),
            (None, artifact) => (None, artifact),
        };
        let event = Event::new(
            self.origin,
            EventPayload::Cd(CdData { deploy, commit, artifact, run: self.run }),
        );
        event.validate()?;
        Ok(event)
    }
}

/// Build a `CI` event from command-line options.
///
/// # Errors
/// `FarosError::Validation` when neither `commit` nor `run` is given.
pub fn build_ci_event(options: &CicdOptions, origin: &str) -> Result<Event> {
    let mut builder = CiEventBuilder::new(origin);
    if let Some(commit) = non_empty(options.commit.as_deref()) {
        builder = builder.commit(commit);
    }
    if let Some(artifact) = non_empty(options.artifact.as_deref()) {
        builder = builder.artifact(artifact);
    }
    if let Some(run) = options.run_execution() {
        builder = builder.run(run);
    }
    builder.build()
}

/// Build a `CD` event from command-line options.
///
/// # Errors
/// `FarosError::Validation` when `deploy` is missing or neither `commit` nor
/// `artifact` is given.
pub fn build_cd_event(options: &CicdOptions, origin: &str) -> Result<Event> {
    let mut builder = CdEventBuilder::new(origin);
    if let Some(deploy) = options.deploy_execution() {
        builder = builder.deploy(deploy);
    }
    if let Some(commit) = non_empty(options.commit.as_deref()) {
        builder = builder.commit(commit);
    }
    if let Some(artifact) = non_empty(options.artifact.as_deref()) {
        builder = builder.artifact(artifact);
    }
    if let Some(run) = options.run_execution() {
        builder = builder.run(run);
    }
    builder.build()
}
