//! Explicit logger handle
//!
//! Components never reach for a global subscriber. The process entry point
//! builds one [`Logger`] and passes it down by reference; every component
//! runs its work inside [`Logger::in_scope`] or [`Logger::instrument`] so the
//! `tracing` events it emits land on that handle's subscriber.

use std::fmt;
use std::future::Future;

use tracing::instrument::{WithDispatch, WithSubscriber};
use tracing::level_filters::LevelFilter;
use tracing::{Dispatch, Subscriber};

/// Cloneable handle to a tracing dispatcher
#[derive(Clone)]
pub struct Logger {
    dispatch: Dispatch,
}

impl Logger {
    pub fn new(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }

    pub fn from_subscriber<S>(subscriber: S) -> Self
    where
        S: Subscriber + Send + Sync + 'static,
    {
        Self::new(Dispatch::new(subscriber))
    }

    /// A logger that discards everything.
    pub fn silent() -> Self {
        Self::new(Dispatch::none())
    }

    /// Human-readable output on stderr, filtered at `level`.
    pub fn stderr(level: LevelFilter) -> Self {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .with_writer(std::io::stderr)
            .finish();
        Self::from_subscriber(subscriber)
    }

    /// Run `f` with this logger as the active dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Attach this logger to a future for every poll.
    pub fn instrument<F: Future>(&self, future: F) -> WithDispatch<F> {
        future.with_subscriber(self.dispatch.clone())
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Buffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn capturing(level: LevelFilter) -> (Logger, Buffer) {
        let buffer = Buffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        (Logger::from_subscriber(subscriber), buffer)
    }

    #[test]
    fn in_scope_routes_events_to_handle() {
        let (logger, buffer) = capturing(LevelFilter::INFO);

        logger.in_scope(|| tracing::info!("resolved configuration"));
        tracing::info!("outside scope");

        let output = buffer.contents();
        assert!(output.contains("resolved configuration"));
        assert!(!output.contains("outside scope"));
    }

    #[test]
    fn level_filter_applies() {
        let (logger, buffer) = capturing(LevelFilter::WARN);

        logger.in_scope(|| {
            tracing::debug!("noisy");
            tracing::warn!("stripped secret field");
        });

        let output = buffer.contents();
        assert!(!output.contains("noisy"));
        assert!(output.contains("stripped secret field"));
    }

    #[tokio::test]
    async fn instrument_covers_future() {
        let (logger, buffer) = capturing(LevelFilter::INFO);

        logger
            .instrument(async {
                tokio::task::yield_now().await;
                tracing::info!("after yield");
            })
            .await;

        assert!(buffer.contents().contains("after yield"));
    }

    #[test]
    fn silent_logger_is_inert() {
        let logger = Logger::silent();
        let value = logger.in_scope(|| {
            tracing::error!("dropped");
            7
        });
        assert_eq!(value, 7);
    }
}
