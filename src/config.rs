//! Configuration for the error handler and the built-in reporters.
//!
//! All configuration types are plain serde structs with `Default` impls.
//! Missing fields in a deserialized document fall back to the defaults, so a
//! host can override only what it cares about:
//!
//! ```rust
//! use distributed_errors::{HandlerConfig, Severity};
//!
//! let config: HandlerConfig =
//!     serde_json::from_str(r#"{ "reporting_threshold": "critical" }"#).unwrap();
//! assert_eq!(config.reporting_threshold, Severity::Critical);
//! assert!(config.enable_reporting);
//! ```
//!
//! Loading from files or the environment is left to the host service.

use crate::core_types::Severity;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;

/// Rejected configuration value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("sample_rate must be within [0.0, 1.0], got {value}")]
    InvalidSampleRate { value: f64 },

    #[error("{field} must be greater than zero")]
    MustBePositive { field: &'static str },

    #[error("{field} must be at most {max}")]
    TooLarge { field: &'static str, max: usize },

    #[error("invalid webhook URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("failed to build HTTP client: {message}")]
    HttpClient { message: String },
}

/// Configuration for [`ErrorHandler`](crate::handler::ErrorHandler).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HandlerConfig {
    /// Attach a stack trace to handled records that lack one.
    pub enable_stack_trace: bool,
    /// Dispatch qualifying records to reporters.
    pub enable_reporting: bool,
    /// Minimum severity dispatched to reporters.
    pub reporting_threshold: Severity,
    /// Frame limit for traces captured by the handler.
    pub max_stack_depth: usize,
    /// Fraction of qualifying records dispatched (1.0 = all).
    pub sample_rate: f64,
    /// Cap on concurrently running reporter invocations. Invocations beyond
    /// the cap are dropped, never queued.
    pub max_in_flight_reports: usize,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            enable_stack_trace: true,
            enable_reporting: true,
            reporting_threshold: Severity::High,
            max_stack_depth: 50,
            sample_rate: 1.0,
            max_in_flight_reports: 1024,
        }
    }
}

impl HandlerConfig {
    /// Validate handler configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if:
    /// - `sample_rate` is outside `[0.0, 1.0]` or not a number
    /// - `max_stack_depth` or `max_in_flight_reports` is zero
    /// - `max_in_flight_reports` exceeds what a tokio semaphore can hold
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.sample_rate) {
            return Err(ConfigError::InvalidSampleRate {
                value: self.sample_rate,
            });
        }
        if self.max_stack_depth == 0 {
            return Err(ConfigError::MustBePositive {
                field: "max_stack_depth",
            });
        }
        if self.max_in_flight_reports == 0 {
            return Err(ConfigError::MustBePositive {
                field: "max_in_flight_reports",
            });
        }
        if self.max_in_flight_reports > Semaphore::MAX_PERMITS {
            return Err(ConfigError::TooLarge {
                field: "max_in_flight_reports",
                max: Semaphore::MAX_PERMITS,
            });
        }
        Ok(())
    }
}

/// Configuration for [`WebhookReporter`](crate::reporters::WebhookReporter).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WebhookReporterConfig {
    /// Endpoint receiving one JSON record per POST.
    pub url: String,
    /// Per-request timeout.
    #[serde(with = "duration_millis")]
    pub timeout: Duration,
}

impl Default for WebhookReporterConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl WebhookReporterConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Validate webhook configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the URL does not parse as an absolute
    /// http(s) URL or the timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.url).map_err(|e| ConfigError::InvalidUrl {
            url: self.url.clone(),
            message: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: self.url.clone(),
                message: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::MustBePositive { field: "timeout" });
        }
        Ok(())
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
