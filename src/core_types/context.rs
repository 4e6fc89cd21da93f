//! Request-scoped context carrier.
//!
//! A [`Context`] travels with a request through the service. Error building
//! reads correlation identifiers from it, and reporters receive it so they can
//! honor cancellation of the originating request.

use crate::core_types::metadata::MetadataValue;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

/// Key under which the request correlation ID is stored.
pub const REQUEST_ID_KEY: &str = "request_id";

/// Key under which the acting user's ID is stored.
pub const USER_ID_KEY: &str = "user_id";

/// Cancellable bag of request-scoped values.
///
/// Cloning is cheap enough to hand a copy to every reporter task; clones share
/// the same cancellation token.
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: HashMap<String, MetadataValue>,
    cancellation: CancellationToken,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context that is cancelled together with `token`.
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            values: HashMap::new(),
            cancellation: token,
        }
    }

    /// Attach a value under `key`, replacing any previous value.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn with_request_id(self, request_id: impl Into<String>) -> Self {
        self.with_value(REQUEST_ID_KEY, request_id.into())
    }

    pub fn with_user_id(self, user_id: impl Into<String>) -> Self {
        self.with_value(USER_ID_KEY, user_id.into())
    }

    pub fn value(&self, key: &str) -> Option<&MetadataValue> {
        self.values.get(key)
    }

    /// String value under `key`; `None` if absent or not a string.
    pub fn str_value(&self, key: &str) -> Option<&str> {
        self.value(key).and_then(MetadataValue::as_str)
    }

    pub fn request_id(&self) -> Option<&str> {
        self.str_value(REQUEST_ID_KEY)
    }

    pub fn user_id(&self) -> Option<&str> {
        self.str_value(USER_ID_KEY)
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Resolves once the context is cancelled.
    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await;
    }
}
