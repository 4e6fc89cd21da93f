//! Logging utilities for distributed-errors
//!
//! Re-exports tracing macros with log_* naming convention for consistency.
//! Reporter failures surface only through these macros, never through the
//! handler itself.

pub use tracing::{debug as log_debug, error as log_error, info as log_info, warn as log_warn};
