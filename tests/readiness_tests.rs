//! # Readiness Wait Tests
//!
//! The bounded health poll against a mockito backend and a closed port.

mod common;

use common::MockBackend;
use ecoverse_probe::config::ProbeConfig;
use ecoverse_probe::probe::{wait_for_backend, ReadinessPolicy};
use ecoverse_probe::{EcoverseApiClient, ProbeError, ProbeRunner, ProbeSettings};
use mockito::Matcher;
use std::time::Duration;

fn policy(max_attempts: u32) -> ReadinessPolicy {
    ReadinessPolicy {
        max_attempts,
        retry_interval: Duration::from_millis(10),
    }
}

#[tokio::test]
async fn test_backend_that_recovers_is_awaited() {
    let mut backend = MockBackend::start().await;
    let starting = backend
        .server
        .mock("GET", "/api/health")
        .with_status(503)
        .expect(2)
        .create_async()
        .await;
    let healthy = backend.health(200).await;

    let attempts = wait_for_backend(&backend.client(), &policy(5)).await.unwrap();

    assert_eq!(attempts, 3);
    starting.assert_async().await;
    healthy.assert_async().await;
}

#[tokio::test]
async fn test_unhealthy_backend_fails_after_exactly_n_attempts() {
    let mut backend = MockBackend::start().await;
    let unhealthy = backend
        .server
        .mock("GET", "/api/health")
        .match_header("authorization", Matcher::Missing)
        .with_status(500)
        .expect(4)
        .create_async()
        .await;

    let err = wait_for_backend(&backend.client(), &policy(4))
        .await
        .unwrap_err();

    assert!(err.is_fatal());
    assert!(matches!(err, ProbeError::BackendUnreachable { attempts: 4, .. }));
    unhealthy.assert_async().await;
}

#[tokio::test]
async fn test_closed_port_aborts_the_run() {
    let mut config = ProbeConfig::default();
    config.endpoint.base_url = "http://127.0.0.1:1/api".to_string();
    config.endpoint.timeout_ms = 2000;
    config.readiness.max_attempts = 2;
    config.readiness.retry_interval_ms = 10;

    let client = EcoverseApiClient::new(config.endpoint.clone().into()).unwrap();
    let runner = ProbeRunner::new(client, ProbeSettings::from_config(&config));

    match runner.run().await {
        Err(ProbeError::BackendUnreachable {
            url,
            attempts,
            last_error,
        }) => {
            assert_eq!(url, "http://127.0.0.1:1/api/health");
            assert_eq!(attempts, 2);
            assert!(last_error.starts_with("HTTP request failed"));
        }
        other => panic!("expected readiness failure, got {other:?}"),
    }
}
