//! Test helper utilities shared by the unit test modules
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

// Allow dead code in test utilities - functions are used across different test files
#![allow(dead_code)]

use crate::config::HandlerConfig;
use crate::core_types::{Context, Severity};
use crate::error::DistributedError;
use crate::reporters::{ReportError, Reporter};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// Reporter that remembers every record it receives.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    received: Mutex<Vec<DistributedError>>,
}

impl RecordingReporter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(&self) -> usize {
        self.received.lock().unwrap().len()
    }

    pub fn received(&self) -> Vec<DistributedError> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl Reporter for RecordingReporter {
    async fn report(&self, _ctx: &Context, err: &DistributedError) -> Result<(), ReportError> {
        self.received.lock().unwrap().push(err.clone());
        Ok(())
    }
}

/// Reporter that always fails.
#[derive(Debug, Default)]
pub struct FailingReporter;

#[async_trait]
impl Reporter for FailingReporter {
    async fn report(&self, _ctx: &Context, _err: &DistributedError) -> Result<(), ReportError> {
        Err(ReportError::sink("sink is down"))
    }
}

/// Reporter that blocks until the test opens the gate.
#[derive(Debug, Default)]
pub struct GatedReporter {
    pub gate: Notify,
}

impl GatedReporter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn open(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl Reporter for GatedReporter {
    async fn report(&self, _ctx: &Context, _err: &DistributedError) -> Result<(), ReportError> {
        self.gate.notified().await;
        Ok(())
    }
}

/// Handler configuration with the given threshold and no handler-side stack capture.
pub fn test_config(threshold: Severity) -> HandlerConfig {
    HandlerConfig {
        enable_stack_trace: false,
        reporting_threshold: threshold,
        ..HandlerConfig::default()
    }
}

/// Poll `condition` until it holds or `timeout` elapses. Returns the final result.
pub async fn wait_for(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
