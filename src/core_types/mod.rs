//! Core types shared by every part of the crate
//!
//! ## Organization
//! - `taxonomy` - Closed error kind and severity enums
//! - `metadata` - Typed metadata values
//! - `context` - Request-scoped context carrier with cancellation

pub mod context;
pub mod metadata;
pub mod taxonomy;

// Re-export commonly used types
pub use context::{Context, REQUEST_ID_KEY, USER_ID_KEY};
pub use metadata::MetadataValue;
pub use taxonomy::{ErrorKind, ParseTaxonomyError, Severity};
