//! Error reporters
//!
//! A [`Reporter`] is a diagnostic sink the handler fans qualifying error
//! records out to. Hosts usually inject their own (alerting, tracing export);
//! two general-purpose sinks ship with the crate:
//!
//! - **tracing_reporter**: emits one structured `tracing` event per record
//! - **webhook**: POSTs the serialized record to an HTTP endpoint
//!
//! Reporter failures are logged by the handler and never fed back into it.

pub mod tracing_reporter;
pub mod webhook;

use crate::core_types::Context;
use crate::error::{BoxError, DistributedError};
use async_trait::async_trait;
use thiserror::Error;

pub use tracing_reporter::TracingReporter;
pub use webhook::WebhookReporter;

/// Failure of a single report delivery.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The sink could not be reached.
    #[error("Report transport failed: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The sink answered but refused the report.
    #[error("Report rejected by sink with status {status}")]
    Rejected { status: u16 },

    /// The originating request was cancelled before delivery finished.
    #[error("Report cancelled")]
    Cancelled,

    /// Any other sink-specific failure.
    #[error("Reporter failed: {message}")]
    Sink { message: String },
}

impl ReportError {
    pub fn transport(message: impl Into<String>, source: Option<BoxError>) -> Self {
        Self::Transport {
            message: message.into(),
            source,
        }
    }

    pub fn sink(message: impl Into<String>) -> Self {
        Self::Sink {
            message: message.into(),
        }
    }
}

/// Diagnostic sink for error records.
///
/// Implementations receive the caller's [`Context`] so they can stop early
/// when the originating request is cancelled. The handler imposes no deadline
/// of its own and never waits for the outcome.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Reporter: Send + Sync {
    /// Deliver one record.
    async fn report(&self, ctx: &Context, err: &DistributedError) -> Result<(), ReportError>;
}
