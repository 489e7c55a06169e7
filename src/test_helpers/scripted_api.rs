//! Scripted [`EcoverseApi`] double with seeded records and join bookkeeping.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};

use crate::api_clients::EcoverseApi;
use crate::error::{ProbeError, ProbeResult};
use crate::types::{
    ActivityEncoding, Collection, JoinOutcome, JoinTarget, NewActivity, RecordId, UserProfile,
};

/// Backend double answering from fixed data.
///
/// Joins behave like the real backend: the first join of an id succeeds and
/// later joins of the same id answer 400 "Already joined".
#[derive(Debug)]
pub struct ScriptedApi {
    base_url: String,
    email: Option<String>,
    /// Health probes that fail before the backend is up; `None` never comes up
    failing_health_checks: Option<u32>,
    activity_status: u16,
    listings: HashMap<Collection, Result<Vec<Value>, u16>>,
    document: Value,
    state: Mutex<ScriptState>,
}

#[derive(Debug, Default)]
struct ScriptState {
    health_checks: u32,
    joined: HashSet<(JoinTarget, RecordId)>,
    calls: Vec<String>,
}

impl ScriptedApi {
    /// A healthy backend with one record in every listing
    pub fn seeded() -> Self {
        let listings = [
            (Collection::Activities, json!({"id": "a1", "type": "CYCLING"})),
            (Collection::Missions, json!({"id": "m1", "title": "Plastic-free week"})),
            (Collection::ShopItems, json!({"id": "s1", "name": "Bamboo bottle"})),
            (Collection::Tours, json!({"id": "t1", "name": "Organic farm visit"})),
            (Collection::Circles, json!({"id": "c1", "name": "Green Commuters"})),
            (Collection::Leaderboard, json!({"id": "u1", "ecoCoins": 120})),
            (Collection::CarbonCredits, json!({"id": "cc1", "amount": 1.2})),
        ]
        .into_iter()
        .map(|(collection, record)| (collection, Ok(vec![record])))
        .collect();

        Self {
            base_url: "http://scripted.test/api/".to_string(),
            email: Some("test@example.com".to_string()),
            failing_health_checks: Some(0),
            activity_status: 201,
            listings,
            document: json!({"openapi": "3.0.0", "paths": {"/health": {}}}),
            state: Mutex::new(ScriptState::default()),
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }

    #[must_use]
    pub fn without_email(mut self) -> Self {
        self.email = None;
        self
    }

    #[must_use]
    pub fn healthy_after(mut self, failures: u32) -> Self {
        self.failing_health_checks = Some(failures);
        self
    }

    #[must_use]
    pub fn never_healthy(mut self) -> Self {
        self.failing_health_checks = None;
        self
    }

    #[must_use]
    pub fn with_activity_status(mut self, status: u16) -> Self {
        self.activity_status = status;
        self
    }

    #[must_use]
    pub fn with_listing(mut self, collection: Collection, records: Vec<Value>) -> Self {
        self.listings.insert(collection, Ok(records));
        self
    }

    #[must_use]
    pub fn with_failing_listing(mut self, collection: Collection, status: u16) -> Self {
        self.listings.insert(collection, Err(status));
        self
    }

    /// Calls made so far, excluding health checks
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    pub fn health_checks(&self) -> u32 {
        self.state.lock().health_checks
    }

    fn record(&self, call: String) {
        self.state.lock().calls.push(call);
    }

    fn profile(&self) -> UserProfile {
        UserProfile {
            email: self.email.clone(),
            id: Some(json!("u1")),
            display_name: Some("Test User".to_string()),
            extra: Default::default(),
        }
    }
}

#[async_trait]
impl EcoverseApi for ScriptedApi {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn health_check(&self) -> ProbeResult<()> {
        let mut state = self.state.lock();
        state.health_checks += 1;
        match self.failing_health_checks {
            Some(failures) if state.health_checks > failures => Ok(()),
            _ => Err(ProbeError::unexpected_status(503, &[200], "starting")),
        }
    }

    async fn sync_user(&self) -> ProbeResult<UserProfile> {
        self.record("sync user".to_string());
        Ok(self.profile())
    }

    async fn get_profile(&self) -> ProbeResult<UserProfile> {
        self.record("get profile".to_string());
        Ok(self.profile())
    }

    async fn create_activity(
        &self,
        activity: &NewActivity,
        encoding: ActivityEncoding,
    ) -> ProbeResult<u16> {
        self.record(format!("create activity {} ({})", activity.kind, encoding));
        match self.activity_status {
            status @ (200 | 201) => Ok(status),
            status => Err(ProbeError::unexpected_status(
                status,
                &[200, 201],
                r#"{"error":"Failed to create activity"}"#,
            )),
        }
    }

    async fn list(&self, collection: Collection) -> ProbeResult<Vec<Value>> {
        self.record(format!("list {}", collection.label()));
        match self.listings.get(&collection) {
            Some(Ok(records)) => Ok(records.clone()),
            Some(Err(status)) => Err(ProbeError::unexpected_status(
                *status,
                &[200],
                r#"{"error":"Internal server error"}"#,
            )),
            None => Ok(Vec::new()),
        }
    }

    async fn join(&self, target: JoinTarget, id: &RecordId) -> ProbeResult<JoinOutcome> {
        let mut state = self.state.lock();
        state.calls.push(format!("join {} {}", target.label(), id));
        if state.joined.insert((target, id.clone())) {
            target.classify(200, "{}")
        } else {
            target.classify(400, r#"{"error":"Already joined"}"#)
        }
    }

    async fn api_document(&self) -> ProbeResult<Value> {
        self.record("api document".to_string());
        Ok(self.document.clone())
    }
}
