//! Bounded-concurrency batch upload
//!
//! Every task is sent through an [`EventSender`] under a bulkhead ceiling.
//! A failing task never affects its siblings: failures are collected in
//! completion order and returned in the [`UploadResult`]. Progress is
//! published on a watch channel after every state change so observers never
//! slow dispatch down.

use std::collections::HashMap;
use std::sync::Arc;

use faros_common::{Bulkhead, BulkheadPermit, Logger};
use faros_domain::constants::DEFAULT_CONCURRENCY;
use faros_domain::{
    FarosError, SendOptions, TaskState, UploadFailure, UploadProgress, UploadResult, UploadTask,
};
use tokio::sync::watch;
use tokio::task::{Id, JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::ports::EventSender;

/// Message recorded for tasks that were never dispatched
pub const CANCELLED_BEFORE_DISPATCH: &str = "cancelled before dispatch";

type TaskOutcome = (String, Result<(), FarosError>);

/// Fans a batch of upload tasks out to an [`EventSender`].
pub struct UploadCoordinator {
    sender: Arc<dyn EventSender>,
    logger: Logger,
    concurrency: usize,
    options: SendOptions,
    progress: Option<watch::Sender<UploadProgress>>,
    cancellation: CancellationToken,
}

impl UploadCoordinator {
    pub fn new(sender: Arc<dyn EventSender>, logger: Logger) -> Self {
        Self {
            sender,
            logger,
            concurrency: DEFAULT_CONCURRENCY,
            options: SendOptions::default(),
            progress: None,
            cancellation: CancellationToken::new(),
        }
    }

    /// Maximum number of sends in flight. Values below 1 are raised to 1.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_send_options(mut self, options: SendOptions) -> Self {
        self.options = options;
        self
    }

    /// Publish [`UploadProgress`] snapshots on `progress`.
    pub fn with_progress(mut self, progress: watch::Sender<UploadProgress>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Stop dispatching new tasks once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Upload every task and aggregate the outcome.
    ///
    /// Never fails as a whole; `uploaded_count + errors.len()` always equals
    /// the number of tasks.
    pub async fn upload_batch(&self, graph: &str, tasks: Vec<UploadTask>) -> UploadResult {
        self.logger.instrument(self.run_batch(graph, tasks)).await
    }

    #[instrument(skip(self, tasks), fields(total = tasks.len(), concurrency = self.concurrency))]
    async fn run_batch(&self, graph: &str, tasks: Vec<UploadTask>) -> UploadResult {
        let mut batch = BatchState::new(tasks.len(), self.progress.as_ref());
        let mut queue = tasks.into_iter();

        let bulkhead = match Bulkhead::new(self.concurrency) {
            Ok(bulkhead) => bulkhead,
            Err(err) => {
                for task in queue {
                    batch.record_undispatched(task.identity, &err.to_string());
                }
                return batch.finish();
            }
        };

        let graph: Arc<str> = Arc::from(graph);
        let mut running: JoinSet<TaskOutcome> = JoinSet::new();
        let mut identities: HashMap<Id, String> = HashMap::new();
        let mut next = queue.next();

        info!(graph = %graph, "starting batch upload");

        while next.is_some() || !running.is_empty() {
            tokio::select! {
                biased;

                Some(joined) = running.join_next_with_id(), if !running.is_empty() => {
                    batch.settle(joined, &mut identities);
                }

                _ = self.cancellation.cancelled(), if next.is_some() => {
                    warn!("upload cancelled; remaining tasks will not be dispatched");
                    for task in next.take().into_iter().chain(queue.by_ref()) {
                        batch.record_undispatched(task.identity, CANCELLED_BEFORE_DISPATCH);
                    }
                }

                permit = bulkhead.acquire(), if next.is_some() => {
                    let Some(task) = next.take() else { continue };
                    match permit {
                        Ok(permit) => {
                            let identity = task.identity.clone();
                            let handle = running.spawn(self.logger.instrument(send_one(
                                Arc::clone(&self.sender),
                                Arc::clone(&graph),
                                task,
                                self.options,
                                permit,
                            )));
                            identities.insert(handle.id(), identity);
                            batch.dispatched();
                        }
                        Err(err) => batch.record_undispatched(task.identity, &err.to_string()),
                    }
                    next = queue.next();
                }
            }
        }

        let result = batch.finish();
        info!(
            uploaded = result.uploaded_count,
            failed = result.errors.len(),
            peak_concurrency = bulkhead.metrics().peak_concurrent,
            "batch upload finished"
        );
        result
    }
}

async fn send_one(
    sender: Arc<dyn EventSender>,
    graph: Arc<str>,
    task: UploadTask,
    options: SendOptions,
    permit: BulkheadPermit,
) -> TaskOutcome {
    let _permit = permit;
    debug!(identity = %task.identity, state = ?TaskState::Sending, "sending event");
    let outcome = sender.send_event(&graph, &task.event, options).await;
    (task.identity, outcome)
}

/// Results and progress owned by one `upload_batch` call
struct BatchState<'a> {
    result: UploadResult,
    progress: UploadProgress,
    publisher: Option<&'a watch::Sender<UploadProgress>>,
}

impl<'a> BatchState<'a> {
    fn new(total: usize, publisher: Option<&'a watch::Sender<UploadProgress>>) -> Self {
        let state = Self {
            result: UploadResult::default(),
            progress: UploadProgress::new(total),
            publisher,
        };
        state.publish();
        state
    }

    fn publish(&self) {
        if let Some(publisher) = self.publisher {
            publisher.send_replace(self.progress);
        }
    }

    fn dispatched(&mut self) {
        self.progress.in_flight += 1;
        self.publish();
    }

    fn settle(
        &mut self,
        joined: Result<(Id, TaskOutcome), JoinError>,
        identities: &mut HashMap<Id, String>,
    ) {
        self.progress.in_flight = self.progress.in_flight.saturating_sub(1);
        match joined {
            Ok((id, (identity, Ok(())))) => {
                identities.remove(&id);
                debug!(identity = %identity, state = ?TaskState::Succeeded, "event uploaded");
                self.result.uploaded_count += 1;
                self.progress.succeeded += 1;
            }
            Ok((id, (identity, Err(err)))) => {
                identities.remove(&id);
                warn!(
                    identity = %identity,
                    error = %err,
                    kind = err.label(),
                    state = ?TaskState::Failed,
                    "event upload failed"
                );
                self.push_failure(identity, err.to_string());
            }
            Err(join_error) => {
                let identity = identities.remove(&join_error.id()).unwrap_or_default();
                warn!(identity = %identity, error = %join_error, "upload task aborted");
                self.push_failure(identity, format!("upload task aborted: {join_error}"));
            }
        }
        self.progress.settled += 1;
        self.publish();
    }

    fn record_undispatched(&mut self, identity: String, message: &str) {
        self.push_failure(identity, message.to_string());
        self.progress.settled += 1;
        self.publish();
    }

    fn push_failure(&mut self, identity: String, error_message: String) {
        self.result.errors.push(UploadFailure { identity, error_message });
        self.progress.failed += 1;
    }

    fn finish(self) -> UploadResult {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use faros_domain::{CiData, Event, EventPayload, UriRef};

    use super::*;

    /// Sender that records peak concurrency and fails a fixed set of identities.
    #[derive(Default)]
    struct MockSender {
        current: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
        failing: HashSet<String>,
        delay: Duration,
        graphs: Mutex<Vec<String>>,
    }

    impl MockSender {
        fn failing(identities: &[&str], delay: Duration) -> Self {
            Self {
                failing: identities.iter().map(|s| s.to_string()).collect(),
                delay,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl EventSender for MockSender {
        async fn send_event(
            &self,
            graph: &str,
            event: &Event,
            _options: SendOptions,
        ) -> faros_domain::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.graphs.lock().unwrap().push(graph.to_string());
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.current.fetch_sub(1, Ordering::SeqCst);

            if self.failing.contains(&event.origin) {
                Err(FarosError::http(400, "rejected"))
            } else {
                Ok(())
            }
        }
    }

    // The identity is carried in the origin so the mock can decide outcomes.
    fn task(identity: &str) -> UploadTask {
        let data = CiData { commit: Some(UriRef::new("GitHub://o/r/sha")), ..CiData::default() };
        UploadTask::new(identity, Event::new(identity, EventPayload::Ci(data)))
    }

    fn tasks(n: usize) -> Vec<UploadTask> {
        (0..n).map(|i| task(&format!("suite-{i}"))).collect()
    }

    #[tokio::test]
    async fn concurrency_ceiling_never_exceeded() {
        let sender = Arc::new(MockSender::failing(&[], Duration::from_millis(20)));
        let coordinator =
            UploadCoordinator::new(sender.clone(), Logger::silent()).with_concurrency(3);

        let result = coordinator.upload_batch("default", tasks(12)).await;

        assert_eq!(result.uploaded_count, 12);
        assert!(result.is_success());
        assert!(sender.peak.load(Ordering::SeqCst) <= 3);
        assert!(sender.peak.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn partial_failure_is_aggregated() {
        let sender = Arc::new(MockSender::failing(&["suite-1"], Duration::from_millis(5)));
        let coordinator = UploadCoordinator::new(sender, Logger::silent());

        let result = coordinator.upload_batch("default", tasks(3)).await;

        assert_eq!(result.uploaded_count, 2);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].identity, "suite-1");
        assert_eq!(result.errors[0].error_message, "HTTP 400: rejected");
        assert_eq!(result.total(), 3);
    }

    #[tokio::test]
    async fn empty_batch_completes() {
        let sender = Arc::new(MockSender::default());
        let (tx, rx) = watch::channel(UploadProgress::default());
        let coordinator = UploadCoordinator::new(sender, Logger::silent()).with_progress(tx);

        let result = coordinator.upload_batch("default", Vec::new()).await;

        assert_eq!(result, UploadResult::default());
        assert!(rx.borrow().is_complete());
    }

    #[tokio::test]
    async fn progress_is_monotonic_and_complete() {
        let sender = Arc::new(MockSender::failing(&["suite-2"], Duration::from_millis(5)));
        let (tx, mut rx) = watch::channel(UploadProgress::default());
        let coordinator = UploadCoordinator::new(sender, Logger::silent())
            .with_concurrency(2)
            .with_progress(tx);

        let observer = tokio::spawn(async move {
            let mut seen = Vec::new();
            while rx.changed().await.is_ok() {
                seen.push(*rx.borrow_and_update());
            }
            seen
        });

        let result = coordinator.upload_batch("default", tasks(5)).await;
        drop(coordinator);
        let seen = observer.await.unwrap();

        assert_eq!(result.uploaded_count, 4);
        assert!(seen.windows(2).all(|w| w[0].settled <= w[1].settled));
        let last = seen.last().copied().unwrap();
        assert_eq!(
            last,
            UploadProgress { total: 5, settled: 5, succeeded: 4, failed: 1, in_flight: 0 }
        );
    }

    #[tokio::test]
    async fn cancellation_stops_new_dispatches() {
        let sender = Arc::new(MockSender::failing(&[], Duration::from_millis(10)));
        let token = CancellationToken::new();
        token.cancel();
        let coordinator = UploadCoordinator::new(sender.clone(), Logger::silent())
            .with_concurrency(2)
            .with_cancellation(token);

        let result = coordinator.upload_batch("default", tasks(4)).await;

        assert_eq!(sender.calls.load(Ordering::SeqCst), 0);
        assert_eq!(result.uploaded_count, 0);
        assert_eq!(result.errors.len(), 4);
        assert!(result.errors.iter().all(|e| e.error_message == CANCELLED_BEFORE_DISPATCH));
    }

    #[tokio::test]
    async fn sends_to_requested_graph() {
        let sender = Arc::new(MockSender::failing(&[], Duration::ZERO));
        let coordinator = UploadCoordinator::new(sender.clone(), Logger::silent());

        coordinator.upload_batch("prod-staging", tasks(2)).await;

        let graphs = sender.graphs.lock().unwrap().clone();
        assert_eq!(graphs, vec!["prod-staging".to_string(), "prod-staging".to_string()]);
    }

    #[test]
    fn concurrency_floor_is_one() {
        let coordinator =
            UploadCoordinator::new(Arc::new(MockSender::default()), Logger::silent())
                .with_concurrency(0);
        assert_eq!(coordinator.concurrency(), 1);
    }
}
