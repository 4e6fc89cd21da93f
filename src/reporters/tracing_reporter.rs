//! Reporter that turns error records into structured `tracing` events.

use crate::core_types::{Context, Severity};
use crate::error::DistributedError;
use crate::logging::{log_error, log_info, log_warn};
use crate::reporters::{ReportError, Reporter};
use async_trait::async_trait;

/// Emits one event per record; the level follows severity
/// (low → INFO, medium → WARN, high and critical → ERROR).
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl TracingReporter {
    pub fn new() -> Self {
        Self
    }
}

macro_rules! emit_record {
    ($log:ident, $ctx:expr, $err:expr) => {
        $log!(
            code = %$err.code(),
            kind = %$err.kind(),
            severity = %$err.severity(),
            service = %$err.service(),
            operation = %$err.operation(),
            request_id = $err.request_id().or($ctx.request_id()).unwrap_or(""),
            user_id = $err.user_id().or($ctx.user_id()).unwrap_or(""),
            retryable = $err.is_retryable(),
            http_status = $err.http_status().unwrap_or(0),
            has_stack_trace = $err.stack_trace().is_some(),
            "{}",
            $err
        )
    };
}

#[async_trait]
impl Reporter for TracingReporter {
    async fn report(&self, ctx: &Context, err: &DistributedError) -> Result<(), ReportError> {
        match err.severity() {
            Severity::Low => emit_record!(log_info, ctx, err),
            Severity::Medium => emit_record!(log_warn, ctx, err),
            Severity::High | Severity::Critical => emit_record!(log_error, ctx, err),
        }
        Ok(())
    }
}
