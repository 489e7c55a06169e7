//! # Mock Backend
//!
//! mockito-backed stand-in for the EcoVerse API, mounted under `/api` like the
//! real server. Each test gets its own server so mocks never collide.

#![allow(dead_code)]

use ecoverse_probe::config::ProbeConfig;
use ecoverse_probe::{EcoverseApiClient, ProbeSettings};
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};

pub const TOKEN: &str = "mock-token";
pub const EMAIL: &str = "test@example.com";

pub struct MockBackend {
    pub server: ServerGuard,
}

impl MockBackend {
    pub async fn start() -> Self {
        Self {
            server: Server::new_async().await,
        }
    }

    pub fn base_url(&self) -> String {
        format!("{}/api", self.server.url())
    }

    /// Probe configuration pointed at this server with a short readiness delay
    pub fn config(&self) -> ProbeConfig {
        let mut config = ProbeConfig::default();
        config.endpoint.base_url = self.base_url();
        config.endpoint.timeout_ms = 5000;
        config.readiness.max_attempts = 3;
        config.readiness.retry_interval_ms = 10;
        config
    }

    pub fn settings(&self) -> ProbeSettings {
        ProbeSettings::from_config(&self.config())
    }

    pub fn client(&self) -> EcoverseApiClient {
        EcoverseApiClient::new(self.config().endpoint.into()).expect("valid mock client config")
    }

    pub async fn health(&mut self, status: usize) -> Mock {
        self.server
            .mock("GET", "/api/health")
            .match_header("authorization", Matcher::Missing)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"OK","timestamp":"2026-10-19T00:00:00.000Z"}"#)
            .create_async()
            .await
    }

    /// Authenticated JSON endpoint
    pub async fn json(&mut self, method: &str, path: &str, status: usize, body: Value) -> Mock {
        self.server
            .mock(method, format!("/api/{path}").as_str())
            .match_header("authorization", format!("Bearer {TOKEN}").as_str())
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    /// Authenticated endpoint answering a raw body
    pub async fn raw(&mut self, method: &str, path: &str, status: usize, body: &str) -> Mock {
        self.server
            .mock(method, format!("/api/{path}").as_str())
            .match_header("authorization", format!("Bearer {TOKEN}").as_str())
            .with_status(status)
            .with_body(body)
            .create_async()
            .await
    }

    pub async fn activity_created(&mut self, status: usize) -> Mock {
        self.server
            .mock("POST", "/api/activities")
            .match_header("authorization", format!("Bearer {TOKEN}").as_str())
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("type".into(), "CYCLING".into()),
                Matcher::UrlEncoded("title".into(), "Morning Commute".into()),
                Matcher::UrlEncoded("description".into(), "Cycled 5km to work".into()),
                Matcher::UrlEncoded("co2Saved".into(), "1.2".into()),
            ]))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"id": "a2", "type": "CYCLING", "status": "PENDING"}).to_string(),
            )
            .create_async()
            .await
    }

    /// Every core endpoint answering like a freshly seeded backend
    pub async fn seed(&mut self) -> SeededRoutes {
        let account = json!({"id": "u1", "email": EMAIL, "displayName": "Test User"});
        let routes = vec![
            ("GET health", self.health(200).await),
            ("POST user/sync", self.json("POST", "user/sync", 200, account.clone()).await),
            ("GET user/profile", self.json("GET", "user/profile", 200, account).await),
            ("POST activities", self.activity_created(201).await),
            (
                "GET activities",
                self.json(
                    "GET",
                    "activities",
                    200,
                    json!([{"id": "a1", "type": "CYCLING", "title": "Morning Commute"}]),
                )
                .await,
            ),
            (
                "GET missions",
                self.json(
                    "GET",
                    "missions",
                    200,
                    json!([
                        {"id": "m1", "title": "Plastic-free week", "reward": 50},
                        {"id": "m2", "title": "Meatless Monday", "reward": 20}
                    ]),
                )
                .await,
            ),
            (
                "POST missions/m1/join",
                self.json(
                    "POST",
                    "missions/m1/join",
                    200,
                    json!({"missionId": "m1", "status": "ACTIVE"}),
                )
                .await,
            ),
            (
                "GET shop/items",
                self.json("GET", "shop/items", 200, json!([{"id": "s1", "name": "Bamboo bottle"}]))
                    .await,
            ),
            (
                "GET tours",
                self.json("GET", "tours", 200, json!([{"id": "t1", "name": "Organic farm visit"}]))
                    .await,
            ),
            (
                "GET circles",
                self.json(
                    "GET",
                    "circles",
                    200,
                    json!([{"id": "c1", "name": "Green Commuters", "_count": {"members": 3}}]),
                )
                .await,
            ),
            (
                "POST circles/c1/join",
                self.json(
                    "POST",
                    "circles/c1/join",
                    200,
                    json!({"circleId": "c1", "role": "MEMBER"}),
                )
                .await,
            ),
        ];
        SeededRoutes { routes }
    }
}

/// Mocks installed by [`MockBackend::seed`], keyed by "METHOD path"
pub struct SeededRoutes {
    routes: Vec<(&'static str, Mock)>,
}

impl SeededRoutes {
    /// Remove a seeded route so a test can mount its own answer
    pub async fn unmount(&mut self, key: &str) {
        if let Some(index) = self.routes.iter().position(|(route, _)| *route == key) {
            let (_, mock) = self.routes.remove(index);
            mock.remove_async().await;
        } else {
            panic!("no seeded route '{key}'");
        }
    }

    /// Every remaining route was hit at least once
    pub async fn assert_all(&self) {
        for (_, mock) in &self.routes {
            mock.assert_async().await;
        }
    }
}
