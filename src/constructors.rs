//! Canonical error constructors.
//!
//! Each factory pins the taxonomy, HTTP status and retry directives for one
//! common failure class. This table is the single mapping between failure
//! classes and transport semantics; new classes belong here rather than in
//! ad hoc builder chains at call sites.
//!
//! | Factory | Code | Kind | Severity | HTTP | Retryable |
//! |---------|------|------|----------|------|-----------|
//! | [`validation_error`] | `VALIDATION_ERROR` | validation | low | 400 | No |
//! | [`not_found_error`] | `NOT_FOUND` | not_found | low | 404 | No |
//! | [`unauthorized_error`] | `UNAUTHORIZED` | authentication | medium | 401 | No |
//! | [`forbidden_error`] | `FORBIDDEN` | authorization | medium | 403 | No |
//! | [`conflict_error`] | `CONFLICT` | conflict | medium | 409 | No |
//! | [`internal_error`] | `INTERNAL_ERROR` | internal | high | 500 | No |
//! | [`network_error`] | `NETWORK_ERROR` | network | medium | - | Yes, 5s |
//! | [`timeout_error`] | `TIMEOUT` | timeout | medium | 408 | Yes, 10s |
//! | [`rate_limit_error`] | `RATE_LIMIT` | rate_limit | low | 429 | Yes, caller |
//! | [`unavailable_error`] | `SERVICE_UNAVAILABLE` | unavailable | high | 503 | Yes, caller |

use crate::core_types::{ErrorKind, Severity};
use crate::error::{BoxError, DistributedError};
use std::time::Duration;

/// Stable machine codes used by the canonical constructors and the handler.
pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const CONFLICT: &str = "CONFLICT";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
    pub const TIMEOUT: &str = "TIMEOUT";
    pub const RATE_LIMIT: &str = "RATE_LIMIT";
    pub const SERVICE_UNAVAILABLE: &str = "SERVICE_UNAVAILABLE";
    /// Assigned by the handler to failures that were not already records.
    pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";
}

/// Suggested retry delay for network failures.
pub const NETWORK_RETRY_AFTER: Duration = Duration::from_secs(5);

/// Suggested retry delay for timeouts.
pub const TIMEOUT_RETRY_AFTER: Duration = Duration::from_secs(10);

/// Input for `field` failed validation.
pub fn validation_error(field: &str, message: &str) -> DistributedError {
    DistributedError::builder(
        codes::VALIDATION_ERROR,
        format!("Validation failed for field '{field}': {message}"),
    )
    .with_kind(ErrorKind::Validation)
    .with_severity(Severity::Low)
    .with_http_status(400)
    .build()
}

pub fn not_found_error(resource: &str, id: &str) -> DistributedError {
    DistributedError::builder(codes::NOT_FOUND, format!("{resource} with id '{id}' not found"))
        .with_kind(ErrorKind::NotFound)
        .with_severity(Severity::Low)
        .with_http_status(404)
        .build()
}

/// Caller could not be authenticated.
pub fn unauthorized_error(message: impl Into<String>) -> DistributedError {
    DistributedError::builder(codes::UNAUTHORIZED, message)
        .with_kind(ErrorKind::Authentication)
        .with_severity(Severity::Medium)
        .with_http_status(401)
        .build()
}

/// Caller is authenticated but not allowed.
pub fn forbidden_error(message: impl Into<String>) -> DistributedError {
    DistributedError::builder(codes::FORBIDDEN, message)
        .with_kind(ErrorKind::Authorization)
        .with_severity(Severity::Medium)
        .with_http_status(403)
        .build()
}

pub fn conflict_error(resource: &str, message: &str) -> DistributedError {
    DistributedError::builder(codes::CONFLICT, format!("Conflict with {resource}: {message}"))
        .with_kind(ErrorKind::Conflict)
        .with_severity(Severity::Medium)
        .with_http_status(409)
        .build()
}

/// Bug or invariant violation. Always carries a stack trace.
pub fn internal_error(message: impl Into<String>, cause: Option<BoxError>) -> DistributedError {
    let mut builder = DistributedError::builder(codes::INTERNAL_ERROR, message)
        .with_kind(ErrorKind::Internal)
        .with_severity(Severity::High)
        .with_http_status(500);
    if let Some(cause) = cause {
        builder = builder.with_cause(cause);
    }
    builder.with_stack_trace().build()
}

/// Transport failure during `operation`. No HTTP status is pinned: the
/// failure is between this service and a peer, not the caller.
pub fn network_error(operation: &str, cause: Option<BoxError>) -> DistributedError {
    let mut builder = DistributedError::builder(
        codes::NETWORK_ERROR,
        format!("Network error during {operation}"),
    )
    .with_kind(ErrorKind::Network)
    .with_severity(Severity::Medium)
    .with_retry(true, NETWORK_RETRY_AFTER);
    if let Some(cause) = cause {
        builder = builder.with_cause(cause);
    }
    builder.build()
}

pub fn timeout_error(operation: &str, timeout: Duration) -> DistributedError {
    DistributedError::builder(
        codes::TIMEOUT,
        format!("Operation '{operation}' timed out after {timeout:?}"),
    )
    .with_kind(ErrorKind::Timeout)
    .with_severity(Severity::Medium)
    .with_retry(true, TIMEOUT_RETRY_AFTER)
    .with_http_status(408)
    .build()
}

/// Caller exceeded its request budget. A zero `retry_after` marks the error
/// retryable without a delay hint, so `retry_after()` is `None`.
pub fn rate_limit_error(retry_after: Duration) -> DistributedError {
    DistributedError::builder(codes::RATE_LIMIT, "Rate limit exceeded")
        .with_kind(ErrorKind::RateLimit)
        .with_severity(Severity::Low)
        .with_retry(true, retry_after)
        .with_http_status(429)
        .build()
}

/// Dependency `service` cannot take requests right now. As with
/// [`rate_limit_error`], a zero `retry_after` leaves no delay hint.
pub fn unavailable_error(service: &str, retry_after: Duration) -> DistributedError {
    DistributedError::builder(
        codes::SERVICE_UNAVAILABLE,
        format!("Service '{service}' is temporarily unavailable"),
    )
    .with_kind(ErrorKind::Unavailable)
    .with_severity(Severity::High)
    .with_retry(true, retry_after)
    .with_http_status(503)
    .build()
}
