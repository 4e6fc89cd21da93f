// Integration Tests for Webhook Reporting
//
// SYSTEMS UNDER TEST: WebhookReporter over HTTP, end to end through ErrorHandler
//
// BUSINESS RESPONSIBILITY:
//   - Delivers error records as JSON to alerting and log-collection endpoints
//   - Classifies sink rejections, transport failures and cancellation
//   - Never lets a failing sink affect the code path that raised the error
//
// TEST COVERAGE:
//   - Successful delivery and JSON body shape
//   - Non-2xx responses
//   - Request timeout and unreachable endpoint
//   - Context cancellation during delivery
//   - Full handler -> webhook flow

mod common;

use common::{create_test_handler, wait_for};
use distributed_errors::{
    codes, constructors, Context, ReportError, Reporter, Severity, WebhookReporter,
    WebhookReporterConfig,
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn reporter_for(server: &MockServer) -> WebhookReporter {
    WebhookReporter::new(WebhookReporterConfig::new(format!("{}/errors", server.uri())))
        .expect("mock server URL is valid")
}

// ============================================================================
// Delivery Tests
// ============================================================================

#[tokio::test]
async fn test_record_is_posted_as_json() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/errors"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(serde_json::json!({
            "code": "TIMEOUT",
            "type": "timeout",
            "severity": "medium",
            "retryable": true,
            "retry_after_ms": 10_000,
            "http_status": 408,
            "request_id": "req-42",
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let reporter = reporter_for(&server);
    let ctx = Context::new().with_request_id("req-42");
    let err = distributed_errors::DistributedError::builder("TIMEOUT", "probe timed out")
        .with_kind(distributed_errors::ErrorKind::Timeout)
        .with_severity(Severity::Medium)
        .with_context(&ctx)
        .with_retry(true, Duration::from_secs(10))
        .with_http_status(408)
        .build();

    // Act
    let result = reporter.report(&ctx, &err).await;

    // Assert
    assert!(result.is_ok(), "delivery failed: {result:?}");
}

#[tokio::test]
async fn test_non_success_status_is_rejected() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/errors"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    let reporter = reporter_for(&server);

    // Act
    let result = reporter
        .report(&Context::new(), &constructors::internal_error("boom", None))
        .await;

    // Assert
    assert!(matches!(result, Err(ReportError::Rejected { status: 500 })));
}

#[tokio::test]
async fn test_slow_sink_hits_request_timeout() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;
    let config = WebhookReporterConfig {
        timeout: Duration::from_millis(100),
        ..WebhookReporterConfig::new(format!("{}/errors", server.uri()))
    };
    let reporter = WebhookReporter::new(config).unwrap();

    // Act
    let result = reporter
        .report(&Context::new(), &constructors::internal_error("boom", None))
        .await;

    // Assert
    assert!(matches!(result, Err(ReportError::Transport { .. })));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_failure() {
    // Arrange: reserve a port, then free it so nothing is listening
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let reporter =
        WebhookReporter::new(WebhookReporterConfig::new(format!("http://127.0.0.1:{port}/errors")))
            .unwrap();

    // Act
    let result = reporter
        .report(&Context::new(), &constructors::internal_error("boom", None))
        .await;

    // Assert
    match result {
        Err(err @ ReportError::Transport { .. }) => {
            assert!(err.to_string().contains("POST"));
            assert!(std::error::Error::source(&err).is_some());
        }
        other => panic!("expected transport failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cancellation_aborts_in_flight_delivery() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;
    let reporter = reporter_for(&server);
    let ctx = Context::new();
    let canceller = ctx.clone();

    // Act
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });
    let started = tokio::time::Instant::now();
    let result = reporter
        .report(&ctx, &constructors::internal_error("boom", None))
        .await;

    // Assert
    assert!(matches!(result, Err(ReportError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(2));
}

// ============================================================================
// Handler Flow Tests
// ============================================================================

#[tokio::test]
async fn test_handler_delivers_qualifying_records_to_webhook() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/errors"))
        .and(body_partial_json(serde_json::json!({
            "code": codes::INTERNAL_ERROR,
            "severity": "high",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let handler = create_test_handler(Severity::High);
    handler.add_reporter(Arc::new(reporter_for(&server)));

    // Act
    let ctx = Context::new().with_request_id("req-77");
    handler.handle(&ctx, constructors::validation_error("email", "invalid format"));
    let record = handler.handle(&ctx, constructors::internal_error("replica store corrupted", None));

    // Assert
    assert_eq!(record.http_status(), Some(500));
    assert!(wait_for(Duration::from_secs(5), || handler.stats().delivered == 1).await);
    assert_eq!(handler.stats().dispatched, 1);
}

#[tokio::test]
async fn test_handler_survives_failing_webhook() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let handler = create_test_handler(Severity::Low);
    handler.add_reporter(Arc::new(reporter_for(&server)));

    // Act
    let record = handler.handle(
        &Context::new(),
        constructors::network_error("peer-3", None),
    );

    // Assert
    assert_eq!(record.code(), codes::NETWORK_ERROR);
    assert!(wait_for(Duration::from_secs(5), || handler.stats().reporter_failures == 1).await);
    assert_eq!(handler.stats().delivered, 0);
}
