//! Reporter that POSTs records as JSON to an HTTP endpoint (alerting hooks,
//! log collectors).

use crate::config::{ConfigError, WebhookReporterConfig};
use crate::core_types::Context;
use crate::error::DistributedError;
use crate::logging::log_debug;
use crate::reporters::{ReportError, Reporter};
use async_trait::async_trait;

/// Sends each record as the JSON body of a POST request.
///
/// Any 2xx response counts as delivered. Cancelling the caller's context
/// aborts an in-flight delivery.
#[derive(Debug, Clone)]
pub struct WebhookReporter {
    client: reqwest::Client,
    config: WebhookReporterConfig,
}

impl WebhookReporter {
    /// Create a webhook reporter
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid or the HTTP
    /// client cannot be constructed.
    pub fn new(config: WebhookReporterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient {
                message: e.to_string(),
            })?;
        Ok(Self { client, config })
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    async fn deliver(&self, err: &DistributedError) -> Result<(), ReportError> {
        let response = self
            .client
            .post(&self.config.url)
            .json(err)
            .send()
            .await
            .map_err(|e| {
                ReportError::transport(
                    format!("POST {} failed: {e}", self.config.url),
                    Some(Box::new(e)),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::Rejected {
                status: status.as_u16(),
            });
        }

        log_debug!(
            url = %self.config.url,
            code = %err.code(),
            status = status.as_u16(),
            "Error record delivered to webhook"
        );
        Ok(())
    }
}

#[async_trait]
impl Reporter for WebhookReporter {
    async fn report(&self, ctx: &Context, err: &DistributedError) -> Result<(), ReportError> {
        if ctx.is_cancelled() {
            return Err(ReportError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(ReportError::Cancelled),
            result = self.deliver(err) => result,
        }
    }
}
