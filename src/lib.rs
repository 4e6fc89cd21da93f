//! # distributed-errors
//!
//! Structured error classification and non-blocking error reporting for
//! distributed services.
//!
//! ## Key Features
//!
//! - **Closed Taxonomy**: Eleven error kinds and four ordered severities
//! - **Structured Records**: Code, message, correlation IDs, cause, timing,
//!   typed metadata, retry directives and HTTP status in one value
//! - **Canonical Constructors**: One factory per common failure class, each
//!   pinning its HTTP status and retry policy
//! - **Centralized Handler**: Normalizes arbitrary failures and fans qualifying
//!   records out to pluggable reporters without blocking the caller
//! - **Stack Capture**: Bounded-depth traces for severe errors
//!
//! ## Example
//!
//! ```rust,no_run
//! use distributed_errors::{constructors, Context, ErrorHandler, HandlerConfig, TracingReporter};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let handler = ErrorHandler::new(HandlerConfig::default())?;
//! handler.add_reporter(Arc::new(TracingReporter::new()));
//!
//! let ctx = Context::new().with_request_id("req-1");
//! let record = handler.handle(&ctx, constructors::internal_error("replica store corrupted", None));
//!
//! assert_eq!(record.http_status(), Some(500));
//! assert!(record.stack_trace().is_some());
//! # Ok(())
//! # }
//! ```

// Allow missing errors documentation - errors are self-documenting via type signatures
#![allow(clippy::missing_errors_doc)]

// Taxonomy, metadata and context carrier
pub mod core_types;

// Logging utilities (re-exports tracing with log_* naming) - internal only
pub(crate) mod logging;

pub mod builder;
pub mod config;
pub mod constructors;
pub mod error;
pub mod handler;
pub mod reporters;
pub mod stack;

#[cfg(test)]
pub mod tests;

// Re-export main types
pub use builder::ErrorBuilder;
pub use config::{ConfigError, HandlerConfig, WebhookReporterConfig};
pub use constructors::codes;
pub use core_types::{
    Context, ErrorKind, MetadataValue, ParseTaxonomyError, Severity, REQUEST_ID_KEY, USER_ID_KEY,
};
pub use error::{chain_contains, BoxError, Cause, DistributedError};
pub use handler::{ErrorHandler, HandlerStats};
pub use reporters::{ReportError, Reporter, TracingReporter, WebhookReporter};
