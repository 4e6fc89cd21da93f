//! Test helper utilities for distributed-errors integration tests
//!
//! This module provides reusable reporters and polling helpers that are
//! shared across multiple integration test files.
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

// Allow dead code in test utilities - functions are used across different test files
#![allow(dead_code)]

use async_trait::async_trait;
use distributed_errors::{
    Context, DistributedError, ErrorHandler, HandlerConfig, ReportError, Reporter, Severity,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Reporter that remembers the records and request IDs it received.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    received: Mutex<Vec<(Option<String>, DistributedError)>>,
}

impl RecordingReporter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(&self) -> usize {
        self.received.lock().unwrap().len()
    }

    pub fn records(&self) -> Vec<DistributedError> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .map(|(_, err)| err.clone())
            .collect()
    }

    pub fn request_ids(&self) -> Vec<Option<String>> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }
}

#[async_trait]
impl Reporter for RecordingReporter {
    async fn report(&self, ctx: &Context, err: &DistributedError) -> Result<(), ReportError> {
        self.received
            .lock()
            .unwrap()
            .push((ctx.request_id().map(str::to_string), err.clone()));
        Ok(())
    }
}

/// Reporter that only counts invocations.
#[derive(Debug, Default)]
pub struct CountingReporter {
    calls: AtomicUsize,
}

impl CountingReporter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Reporter for CountingReporter {
    async fn report(&self, _ctx: &Context, _err: &DistributedError) -> Result<(), ReportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Create a handler reporting at `threshold` with handler-side stack capture off.
pub fn create_test_handler(threshold: Severity) -> ErrorHandler {
    ErrorHandler::new(HandlerConfig {
        enable_stack_trace: false,
        reporting_threshold: threshold,
        ..HandlerConfig::default()
    })
    .expect("test handler config is valid")
}

/// Poll `condition` until it holds or `timeout` elapses.
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
