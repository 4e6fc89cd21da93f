//! Consuming builder for [`DistributedError`] records.
//!
//! Every `with_*` method takes the draft by value and hands it back, so a
//! record is assembled in one expression and nothing else can observe the
//! draft while it is incomplete.
//!
//! ```rust
//! use distributed_errors::{Context, DistributedError, ErrorKind, Severity};
//! use std::time::Duration;
//!
//! let ctx = Context::new().with_request_id("req-42");
//! let err = DistributedError::builder("MODEL_SYNC_FAILED", "replica rejected model chunk")
//!     .with_kind(ErrorKind::External)
//!     .with_severity(Severity::Medium)
//!     .with_service("model-registry")
//!     .with_operation("sync")
//!     .with_context(&ctx)
//!     .with_metadata("chunk", 7)
//!     .with_retry(true, Duration::from_secs(2))
//!     .build();
//!
//! assert_eq!(err.request_id(), Some("req-42"));
//! assert!(err.stack_trace().is_none());
//! ```

use crate::core_types::{Context, ErrorKind, MetadataValue, Severity};
use crate::error::{BoxError, Cause, DistributedError};
use crate::logging::log_debug;
use crate::stack::{self, DEFAULT_STACK_DEPTH};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Draft of a [`DistributedError`].
///
/// Kind and severity stay unset until [`build`](Self::build), which fills
/// `internal` and `medium` respectively when the caller did not choose.
#[derive(Debug)]
#[must_use = "an error builder does nothing until `build` is called"]
pub struct ErrorBuilder {
    code: String,
    message: String,
    kind: Option<ErrorKind>,
    severity: Option<Severity>,
    service: String,
    operation: String,
    request_id: Option<String>,
    user_id: Option<String>,
    cause: Option<Cause>,
    stack_trace: Option<String>,
    timestamp: DateTime<Utc>,
    duration: Option<Duration>,
    metadata: HashMap<String, MetadataValue>,
    retryable: bool,
    retry_after: Option<Duration>,
    http_status: Option<u16>,
}

impl ErrorBuilder {
    /// Open a draft stamped with the current time and empty metadata.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            kind: None,
            severity: None,
            service: String::new(),
            operation: String::new(),
            request_id: None,
            user_id: None,
            cause: None,
            stack_trace: None,
            timestamp: Utc::now(),
            duration: None,
            metadata: HashMap::new(),
            retryable: false,
            retry_after: None,
            http_status: None,
        }
    }

    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Logical service the failure originated in.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = operation.into();
        self
    }

    /// Wrap the underlying failure.
    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(Arc::from(cause.into()));
        self
    }

    /// Wrap a cause that is already shared, e.g. one taken from another record.
    pub fn with_shared_cause(mut self, cause: Cause) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Copy correlation identifiers out of `ctx`.
    ///
    /// Only string values under `request_id` and `user_id` are taken; missing
    /// or differently typed values are ignored so building can never fail.
    pub fn with_context(mut self, ctx: &Context) -> Self {
        if let Some(request_id) = ctx.request_id() {
            self.request_id = Some(request_id.to_string());
        }
        if let Some(user_id) = ctx.user_id() {
            self.user_id = Some(user_id.to_string());
        }
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// How long the failed operation ran before failing.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    /// Mark the error as retryable (or not). A zero `retry_after` means no hint.
    pub fn with_retry(mut self, retryable: bool, retry_after: Duration) -> Self {
        self.retryable = retryable;
        self.retry_after = (!retry_after.is_zero()).then_some(retry_after);
        self
    }

    /// Capture the stack at this point, regardless of severity.
    pub fn with_stack_trace(mut self) -> Self {
        self.stack_trace = Some(stack::capture(DEFAULT_STACK_DEPTH));
        self
    }

    /// Finalize the record.
    ///
    /// Unset kind becomes `internal`, unset severity becomes `medium`, and
    /// high or critical records without a trace get one captured here.
    pub fn build(self) -> DistributedError {
        let kind = self.kind.unwrap_or(ErrorKind::Internal);
        let severity = self.severity.unwrap_or(Severity::Medium);

        let stack_trace = match self.stack_trace {
            Some(trace) if !trace.is_empty() => Some(trace),
            _ if severity.captures_stack() => Some(stack::capture(DEFAULT_STACK_DEPTH)),
            _ => None,
        };

        log_debug!(
            code = %self.code,
            kind = %kind,
            severity = %severity,
            has_cause = self.cause.is_some(),
            "Error record built"
        );

        DistributedError {
            code: self.code,
            message: self.message,
            kind,
            severity,
            service: self.service,
            operation: self.operation,
            request_id: self.request_id,
            user_id: self.user_id,
            cause: self.cause,
            stack_trace,
            timestamp: self.timestamp,
            duration: self.duration,
            metadata: self.metadata,
            retryable: self.retryable,
            retry_after: self.retry_after,
            http_status: self.http_status,
        }
    }
}
