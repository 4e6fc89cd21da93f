//! Closed error taxonomy: what kind of failure happened and how bad it is.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Classification of a failure.
///
/// Purely classificatory: the kind carries no behavior itself. Transport and
/// retry semantics are pinned by the canonical constructors, not by the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller supplied input that failed validation.
    Validation,
    /// Caller could not be identified.
    Authentication,
    /// Caller was identified but is not allowed to perform the action.
    Authorization,
    /// Requested resource does not exist.
    NotFound,
    /// Request conflicts with current resource state.
    Conflict,
    /// Bug or invariant violation inside the service.
    Internal,
    /// A dependency outside the service failed.
    External,
    /// Transport-level failure talking to a peer.
    Network,
    /// Operation exceeded its time budget.
    Timeout,
    /// Caller is being throttled.
    RateLimit,
    /// Service is temporarily unable to serve requests.
    Unavailable,
}

impl ErrorKind {
    /// Every kind, in declaration order.
    pub const ALL: [ErrorKind; 11] = [
        Self::Validation,
        Self::Authentication,
        Self::Authorization,
        Self::NotFound,
        Self::Conflict,
        Self::Internal,
        Self::External,
        Self::Network,
        Self::Timeout,
        Self::RateLimit,
        Self::Unavailable,
    ];

    /// Wire name of the kind (matches the serde representation).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Authentication => "authentication",
            Self::Authorization => "authorization",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
            Self::External => "external",
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::RateLimit => "rate_limit",
            Self::Unavailable => "unavailable",
        }
    }

    /// Severity the canonical constructor table associates with this kind.
    ///
    /// `External` has no canonical constructor and is treated as medium.
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::Validation | Self::NotFound | Self::RateLimit => Severity::Low,
            Self::Authentication
            | Self::Authorization
            | Self::Conflict
            | Self::External
            | Self::Network
            | Self::Timeout => Severity::Medium,
            Self::Internal | Self::Unavailable => Severity::High,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorKind {
    type Err = ParseTaxonomyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseTaxonomyError::UnknownKind {
                value: s.to_string(),
            })
    }
}

/// How bad a failure is.
///
/// Ordering follows the rank: `Low < Medium < High < Critical`. Severity is
/// used for threshold comparison and for picking a local log level, nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Integer rank used for threshold comparison (low=1 .. critical=4).
    pub fn rank(&self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }

    /// Whether this severity meets or exceeds `threshold`.
    pub fn meets(&self, threshold: Severity) -> bool {
        self.rank() >= threshold.rank()
    }

    /// Severities that get a stack trace automatically at build time.
    pub fn captures_stack(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ParseTaxonomyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|severity| severity.as_str() == s)
            .ok_or_else(|| ParseTaxonomyError::UnknownSeverity {
                value: s.to_string(),
            })
    }
}

/// Failure to parse a taxonomy value from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseTaxonomyError {
    #[error("unknown error kind: {value}")]
    UnknownKind { value: String },

    #[error("unknown severity: {value}")]
    UnknownSeverity { value: String },
}
