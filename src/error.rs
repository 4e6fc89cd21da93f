//! The structured error record.
//!
//! [`DistributedError`] is the value every failure in the service is turned
//! into. It carries a stable machine code, a human message, taxonomy tags,
//! correlation identifiers, an optional cause, timing, typed metadata, retry
//! directives and an optional HTTP status mapping.
//!
//! Records are assembled with [`ErrorBuilder`](crate::builder::ErrorBuilder)
//! or one of the canonical constructors in [`constructors`](crate::constructors)
//! and are read-only afterwards.
//!
//! # Example
//!
//! ```rust
//! use distributed_errors::{constructors, ErrorKind};
//!
//! let err = constructors::not_found_error("model", "llama3");
//! assert_eq!(err.to_string(), "NOT_FOUND: model with id 'llama3' not found");
//! assert_eq!(err.kind(), ErrorKind::NotFound);
//! assert_eq!(err.http_status(), Some(404));
//! ```

use crate::builder::ErrorBuilder;
use crate::constructors::codes;
use crate::core_types::{ErrorKind, MetadataValue, Severity};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::any::Any;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Boxed error accepted wherever an arbitrary failure can enter the crate.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Shared handle to the externally owned error a record wraps.
pub type Cause = Arc<dyn StdError + Send + Sync + 'static>;

/// Structured, severity-ranked error record.
///
/// `kind` and `severity` are always populated: the builder fills defaults
/// before a record exists.
#[derive(Debug, Clone, Serialize)]
pub struct DistributedError {
    pub(crate) code: String,
    pub(crate) message: String,
    #[serde(rename = "type")]
    pub(crate) kind: ErrorKind,
    pub(crate) severity: Severity,

    pub(crate) service: String,
    pub(crate) operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) user_id: Option<String>,

    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_cause"
    )]
    pub(crate) cause: Option<Cause>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) stack_trace: Option<String>,

    pub(crate) timestamp: DateTime<Utc>,
    #[serde(
        rename = "duration_ms",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_millis"
    )]
    pub(crate) duration: Option<Duration>,

    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub(crate) metadata: HashMap<String, MetadataValue>,

    pub(crate) retryable: bool,
    #[serde(
        rename = "retry_after_ms",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_millis"
    )]
    pub(crate) retry_after: Option<Duration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) http_status: Option<u16>,
}

impl DistributedError {
    /// Open a builder for a new record.
    pub fn builder(code: impl Into<String>, message: impl Into<String>) -> ErrorBuilder {
        ErrorBuilder::new(code, message)
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// The single error this record wraps, if any.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    pub fn stack_trace(&self) -> Option<&str> {
        self.stack_trace.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn metadata(&self) -> &HashMap<String, MetadataValue> {
        &self.metadata
    }

    pub fn metadata_value(&self, key: &str) -> Option<&MetadataValue> {
        self.metadata.get(key)
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }

    pub fn http_status(&self) -> Option<u16> {
        self.http_status
    }

    /// Coarse equivalence: same `code` and same `kind`.
    ///
    /// Message, metadata and cause are ignored, so two records describing
    /// different failures under one code compare equal.
    pub fn is(&self, other: &DistributedError) -> bool {
        self.code == other.code && self.kind == other.kind
    }

    /// Deepest error in the cause chain, or `self` when there is no cause.
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        let mut current: &(dyn StdError + 'static) = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current
    }

    /// Value for an HTTP `Retry-After` header, in whole seconds rounded up.
    ///
    /// `None` unless the record is retryable with a non-zero delay.
    pub fn retry_after_header(&self) -> Option<String> {
        if !self.retryable {
            return None;
        }
        let delay = self.retry_after?;
        let mut seconds = delay.as_secs();
        if delay.subsec_nanos() > 0 || seconds == 0 {
            seconds += 1;
        }
        Some(seconds.to_string())
    }

    /// Serialized shape of the record, as sent to logging and HTTP layers.
    pub fn to_json(&self) -> serde_json::Value {
        // Every field serializes infallibly: strings, numbers, maps with
        // string keys and an RFC 3339 timestamp.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Normalize an arbitrary failure into a record.
    ///
    /// A boxed `DistributedError` is unwrapped unchanged; anything else is
    /// wrapped as `UNKNOWN_ERROR` (internal, medium) with the original as cause.
    pub fn from_boxed(err: BoxError) -> Self {
        match err.downcast::<DistributedError>() {
            Ok(record) => *record,
            Err(other) => Self::wrap_unknown(other),
        }
    }

    /// Normalize any value accepted by [`ErrorHandler::handle`](crate::handler::ErrorHandler::handle).
    ///
    /// An `anyhow::Error` goes through [`From<anyhow::Error>`] so a record it
    /// carries is recovered; boxing it first would hide the record behind
    /// anyhow's own wrapper type.
    pub fn normalize<E>(err: E) -> Self
    where
        E: Into<BoxError> + 'static,
    {
        let mut slot = Some(err);
        let as_anyhow = (&mut slot as &mut dyn Any)
            .downcast_mut::<Option<anyhow::Error>>()
            .and_then(Option::take);

        match (as_anyhow, slot) {
            (Some(err), _) => Self::from(err),
            (None, Some(err)) => Self::from_boxed(err.into()),
            // The slot is only emptied by the anyhow branch.
            (None, None) => Self::wrap_unknown(BoxError::from("error value unavailable")),
        }
    }

    fn wrap_unknown(cause: BoxError) -> Self {
        ErrorBuilder::new(codes::UNKNOWN_ERROR, cause.to_string())
            .with_kind(ErrorKind::Internal)
            .with_severity(Severity::Medium)
            .with_cause(cause)
            .build()
    }

    pub(crate) fn attach_stack_trace(&mut self, trace: String) {
        self.stack_trace = Some(trace);
    }

    pub(crate) fn has_stack_trace(&self) -> bool {
        self.stack_trace.as_deref().is_some_and(|s| !s.is_empty())
    }
}

impl fmt::Display for DistributedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}: {} (caused by: {})", self.code, self.message, cause),
            None => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

impl StdError for DistributedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

impl From<anyhow::Error> for DistributedError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<DistributedError>() {
            Ok(record) => record,
            Err(other) => Self::wrap_unknown(BoxError::from(other)),
        }
    }
}

/// Walk the source chain of `err` (starting with `err` itself) looking for a
/// [`DistributedError`] equivalent to `target` under [`DistributedError::is`].
pub fn chain_contains(err: &(dyn StdError + 'static), target: &DistributedError) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e
            .downcast_ref::<DistributedError>()
            .is_some_and(|record| record.is(target))
        {
            return true;
        }
        current = e.source();
    }
    false
}

fn serialize_cause<S: Serializer>(cause: &Option<Cause>, serializer: S) -> Result<S::Ok, S::Error> {
    match cause {
        Some(cause) => serializer.serialize_str(&cause.to_string()),
        None => serializer.serialize_none(),
    }
}

fn serialize_millis<S: Serializer>(
    duration: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match duration {
        Some(d) => serializer.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
        None => serializer.serialize_none(),
    }
}
