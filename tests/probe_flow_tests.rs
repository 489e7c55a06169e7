//! # End-to-End Probe Flow Tests
//!
//! Runs the full probe sequence against a mockito backend and checks the
//! ordering, id hand-off, tolerance and skip rules through the report.

mod common;

use common::MockBackend;
use ecoverse_probe::probe::{StepOutcome, StepSelection};
use ecoverse_probe::{OutputFormat, ProbeError, ProbeRunner, StepId};
use serde_json::json;

#[tokio::test]
async fn test_seeded_backend_passes_every_core_step() {
    let mut backend = MockBackend::start().await;
    let routes = backend.seed().await;

    let runner = ProbeRunner::new(backend.client(), backend.settings());
    let report = runner.run().await.unwrap();

    let order: Vec<_> = report.steps.iter().map(|record| record.step).collect();
    assert_eq!(order, StepId::CORE.to_vec());
    assert!(report.is_success(), "{}", report.render_table());
    assert_eq!(report.readiness_attempts, 1);
    assert_eq!(report.base_url, format!("{}/", backend.base_url()));

    routes.assert_all().await;
}

#[tokio::test]
async fn test_second_run_tolerates_already_joined() {
    let mut backend = MockBackend::start().await;
    let mut routes = backend.seed().await;
    // Replace the join endpoints with their "repeat join" answers
    routes.unmount("POST missions/m1/join").await;
    routes.unmount("POST circles/c1/join").await;
    let _mission_again = backend
        .json(
            "POST",
            "missions/m1/join",
            400,
            json!({"error": "You have already joined this mission"}),
        )
        .await;
    let _circle_again = backend
        .json("POST", "circles/c1/join", 400, json!({"error": "Already a member"}))
        .await;

    let report = ProbeRunner::new(backend.client(), backend.settings())
        .run()
        .await
        .unwrap();

    assert_eq!(
        report.outcome_of(StepId::JoinMission),
        Some(&StepOutcome::Passed {
            detail: "mission m1 already joined".to_string()
        })
    );
    assert_eq!(
        report.outcome_of(StepId::JoinCircle),
        Some(&StepOutcome::Passed {
            detail: "circle c1 already joined".to_string()
        })
    );
    assert!(report.is_success());
}

#[tokio::test]
async fn test_failures_are_isolated_to_their_step() {
    let mut backend = MockBackend::start().await;
    let mut routes = backend.seed().await;
    routes.unmount("GET user/profile").await;
    routes.unmount("GET tours").await;
    let _profile = backend
        .json("GET", "user/profile", 200, json!({"email": "other@example.com"}))
        .await;
    let _tours = backend.json("GET", "tours", 200, json!([])).await;

    let report = ProbeRunner::new(backend.client(), backend.settings())
        .run()
        .await
        .unwrap();

    assert!(matches!(
        report.outcome_of(StepId::GetProfile),
        Some(StepOutcome::Failed { reason }) if reason.contains("other@example.com")
    ));
    assert!(matches!(
        report.outcome_of(StepId::ListTours),
        Some(StepOutcome::Failed { reason }) if reason.contains("Empty collection")
    ));
    let summary = report.summary();
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.passed, StepId::CORE.len() - 2);
    assert!(matches!(
        report.into_result(),
        Err(ProbeError::StepsFailed { failed: 2, .. })
    ));
}

#[tokio::test]
async fn test_numeric_circle_id_is_used_for_join() {
    let mut backend = MockBackend::start().await;
    let mut routes = backend.seed().await;
    routes.unmount("GET circles").await;
    routes.unmount("POST circles/c1/join").await;
    let _circles = backend
        .json("GET", "circles", 200, json!([{"id": 7, "name": "Zero Waste"}]))
        .await;
    let join = backend
        .json("POST", "circles/7/join", 201, json!({"circleId": 7}))
        .await;

    let report = ProbeRunner::new(backend.client(), backend.settings())
        .run()
        .await
        .unwrap();

    assert!(report.is_success(), "{}", report.render_table());
    join.assert_async().await;
}

#[tokio::test]
async fn test_filtered_listing_skips_dependent_join() {
    let mut backend = MockBackend::start().await;
    let _routes = backend.seed().await;
    let never_joined = backend
        .server
        .mock("POST", "/api/missions/m1/join")
        .expect(0)
        .create_async()
        .await;

    let settings = backend.settings().with_selection(StepSelection {
        skip: vec![StepId::ListMissions],
        ..Default::default()
    });
    let report = ProbeRunner::new(backend.client(), settings).run().await.unwrap();

    assert_eq!(
        report.outcome_of(StepId::ListMissions),
        Some(&StepOutcome::Skipped {
            reason: "filtered out".to_string()
        })
    );
    assert!(matches!(
        report.outcome_of(StepId::JoinMission),
        Some(StepOutcome::Skipped { .. })
    ));
    never_joined.assert_async().await;
}

#[tokio::test]
async fn test_extended_checks_run_last() {
    let mut backend = MockBackend::start().await;
    let _routes = backend.seed().await;
    let _leaderboard = backend
        .json(
            "GET",
            "user/leaderboard",
            200,
            json!([{"id": "u1", "displayName": "Test User", "ecoCoins": 120}]),
        )
        .await;
    let _credits = backend.json("GET", "carbon/my-credits", 200, json!([])).await;
    let _docs = backend
        .server
        .mock("GET", "/api/docs.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"openapi": "3.0.0", "paths": {"/health": {}, "/missions": {}}}).to_string(),
        )
        .create_async()
        .await;

    let settings = backend.settings().with_selection(StepSelection {
        extended: true,
        ..Default::default()
    });
    let report = ProbeRunner::new(backend.client(), settings).run().await.unwrap();

    assert!(report.is_success(), "{}", report.render_table());
    assert_eq!(report.steps.len(), StepId::CORE.len() + StepId::EXTENDED.len());
    assert_eq!(
        report.outcome_of(StepId::ApiDocument),
        Some(&StepOutcome::Passed {
            detail: "2 documented paths".to_string()
        })
    );

    let rendered = OutputFormat::Json.render(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(value["summary"]["passed"], 13);
}
