//! Centralized error handling with threshold-gated, non-blocking reporting.
//!
//! [`ErrorHandler::handle`] turns any failure into a [`DistributedError`],
//! optionally attaches a stack trace, and, when the record's severity meets
//! the configured threshold, fans it out to every registered [`Reporter`] on
//! the ambient tokio runtime. The caller gets the record back immediately;
//! reporter outcomes are only ever visible in local logs and [`HandlerStats`].
//!
//! # Dispatch limits
//!
//! Reporter invocations run as independent tasks, capped at
//! `max_in_flight_reports` at a time. An invocation that finds the cap
//! exhausted is dropped and counted, so a burst of severe errors cannot pile
//! up unbounded work behind a slow sink.
//!
//! # Example
//!
//! ```rust,no_run
//! use distributed_errors::{Context, ErrorHandler, HandlerConfig, TracingReporter};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let handler = ErrorHandler::new(HandlerConfig::default())?;
//! handler.add_reporter(Arc::new(TracingReporter::new()));
//!
//! let ctx = Context::new().with_request_id("req-7");
//! let err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
//! let record = handler.handle(&ctx, err);
//! assert_eq!(record.code(), "UNKNOWN_ERROR");
//! # Ok(())
//! # }
//! ```

use crate::config::{ConfigError, HandlerConfig};
use crate::core_types::Context;
use crate::error::{BoxError, DistributedError};
use crate::logging::{log_debug, log_warn};
use crate::reporters::Reporter;
use crate::stack;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Semaphore;

/// Point-in-time view of the handler's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandlerStats {
    /// Records passed through `handle`.
    pub handled: u64,
    /// Reporter invocations spawned.
    pub dispatched: u64,
    /// Reporter invocations that completed successfully.
    pub delivered: u64,
    /// Qualifying records skipped by sampling.
    pub sampled_out: u64,
    /// Reporter invocations dropped because the in-flight cap was reached or
    /// no runtime was available.
    pub dropped: u64,
    /// Reporter invocations that returned an error.
    pub reporter_failures: u64,
}

#[derive(Debug, Default)]
struct Counters {
    handled: AtomicU64,
    dispatched: AtomicU64,
    delivered: AtomicU64,
    sampled_out: AtomicU64,
    dropped: AtomicU64,
    reporter_failures: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64, by: u64) {
        counter.fetch_add(by, Ordering::Relaxed);
    }

    fn snapshot(&self) -> HandlerStats {
        HandlerStats {
            handled: self.handled.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            sampled_out: self.sampled_out.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            reporter_failures: self.reporter_failures.load(Ordering::Relaxed),
        }
    }
}

/// Centralized error handler.
///
/// Created once at service startup and shared (typically behind an `Arc`).
/// The reporter list is the only mutable state; it is guarded by a
/// reader/writer lock that is never held across a reporter call.
pub struct ErrorHandler {
    config: HandlerConfig,
    reporters: RwLock<Vec<Arc<dyn Reporter>>>,
    in_flight: Arc<Semaphore>,
    counters: Arc<Counters>,
}

impl std::fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorHandler")
            .field("config", &self.config)
            .field("reporters", &self.reporter_count())
            .field("stats", &self.stats())
            .finish()
    }
}

impl Default for ErrorHandler {
    fn default() -> Self {
        Self::from_validated(HandlerConfig::default())
    }
}

impl ErrorHandler {
    /// Create a handler from `config`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` fails [`HandlerConfig::validate`].
    pub fn new(config: HandlerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: HandlerConfig) -> Self {
        Self {
            in_flight: Arc::new(Semaphore::new(config.max_in_flight_reports)),
            config,
            reporters: RwLock::new(Vec::new()),
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    /// Register a reporter. Takes effect for the next `handle` call.
    pub fn add_reporter(&self, reporter: Arc<dyn Reporter>) {
        self.reporters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(reporter);
    }

    pub fn reporter_count(&self) -> usize {
        self.reporters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn stats(&self) -> HandlerStats {
        self.counters.snapshot()
    }

    /// Normalize `err`, report it if it qualifies, and return the record.
    ///
    /// A `DistributedError` passed directly or inside an `anyhow::Error` is
    /// kept as is. Never fails and never waits on reporters.
    pub fn handle<E>(&self, ctx: &Context, err: E) -> DistributedError
    where
        E: Into<BoxError> + 'static,
    {
        self.process(ctx, DistributedError::normalize(err))
    }

    /// [`handle`](Self::handle) for `anyhow` errors, recovering a
    /// `DistributedError` that was converted into the `anyhow::Error`.
    pub fn handle_anyhow(&self, ctx: &Context, err: anyhow::Error) -> DistributedError {
        self.process(ctx, DistributedError::from(err))
    }

    /// Whether `err` meets the reporting threshold.
    pub fn should_report(&self, err: &DistributedError) -> bool {
        err.severity().meets(self.config.reporting_threshold)
    }

    fn process(&self, ctx: &Context, mut record: DistributedError) -> DistributedError {
        Counters::bump(&self.counters.handled, 1);

        if self.config.enable_stack_trace && !record.has_stack_trace() {
            record.attach_stack_trace(stack::capture(self.config.max_stack_depth));
        }

        let qualifies = self.config.enable_reporting && self.should_report(&record);

        log_debug!(
            code = %record.code(),
            kind = %record.kind(),
            severity = %record.severity(),
            request_id = ctx.request_id().unwrap_or(""),
            report = qualifies,
            "Error handled"
        );

        if qualifies {
            if self.sampled_in() {
                self.dispatch(ctx, &record);
            } else {
                Counters::bump(&self.counters.sampled_out, 1);
            }
        }

        record
    }

    fn sampled_in(&self) -> bool {
        let rate = self.config.sample_rate;
        rate >= 1.0 || (rate > 0.0 && fastrand::f64() < rate)
    }

    fn snapshot_reporters(&self) -> Vec<Arc<dyn Reporter>> {
        self.reporters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn dispatch(&self, ctx: &Context, record: &DistributedError) {
        let reporters = self.snapshot_reporters();
        if reporters.is_empty() {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            Counters::bump(&self.counters.dropped, reporters.len() as u64);
            log_warn!(
                code = %record.code(),
                reporters = reporters.len(),
                "No tokio runtime available, error report dropped"
            );
            return;
        };

        let shared = Arc::new(record.clone());

        for (index, reporter) in reporters.into_iter().enumerate() {
            let Ok(permit) = Arc::clone(&self.in_flight).try_acquire_owned() else {
                Counters::bump(&self.counters.dropped, 1);
                log_warn!(
                    reporter = index,
                    code = %record.code(),
                    max_in_flight_reports = self.config.max_in_flight_reports,
                    "Reporter dispatch limit reached, error report dropped"
                );
                continue;
            };

            Counters::bump(&self.counters.dispatched, 1);

            let ctx = ctx.clone();
            let record = Arc::clone(&shared);
            let counters = Arc::clone(&self.counters);

            runtime.spawn(async move {
                let outcome = reporter.report(&ctx, &record).await;
                drop(permit);
                match outcome {
                    Ok(()) => Counters::bump(&counters.delivered, 1),
                    Err(e) => {
                        Counters::bump(&counters.reporter_failures, 1);
                        log_warn!(
                            reporter = index,
                            code = %record.code(),
                            error = %e,
                            "Failed to report error"
                        );
                    }
                }
            });
        }
    }
}
