//! # EcoVerse API Client
//!
//! HTTP client for the EcoVerse REST API.
//! Provides the health check plus the account, activity, mission, shop, tour
//! and circle calls the probe steps exercise.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::EndpointConfig;
use crate::error::{ProbeError, ProbeResult};
use crate::types::{
    json_kind, ActivityEncoding, Collection, JoinOutcome, JoinTarget, NewActivity, RecordId,
    UserProfile,
};

const OK: &[u16] = &[200];
const CREATED: &[u16] = &[200, 201];

/// Operations the probe needs from the backend.
///
/// Implemented by [`EcoverseApiClient`]; tests substitute scripted doubles.
#[async_trait]
pub trait EcoverseApi: Send + Sync {
    /// Base URL requests are resolved against.
    fn base_url(&self) -> &str;

    /// Single `GET /health` probe; succeeds only on 200.
    async fn health_check(&self) -> ProbeResult<()>;

    /// Provision or refresh the caller's account.
    async fn sync_user(&self) -> ProbeResult<UserProfile>;

    /// Read the caller's profile.
    async fn get_profile(&self) -> ProbeResult<UserProfile>;

    /// Submit an activity; returns the success status (200 or 201).
    async fn create_activity(
        &self,
        activity: &NewActivity,
        encoding: ActivityEncoding,
    ) -> ProbeResult<u16>;

    /// Fetch a listing; the body must be a JSON array.
    async fn list(&self, collection: Collection) -> ProbeResult<Vec<Value>>;

    /// Join a mission or circle.
    async fn join(&self, target: JoinTarget, id: &RecordId) -> ProbeResult<JoinOutcome>;

    /// Fetch the published OpenAPI document.
    async fn api_document(&self) -> ProbeResult<Value>;
}

/// Configuration for the EcoVerse API client
#[derive(Debug, Clone)]
pub struct EcoverseApiConfig {
    /// Base URL including the API prefix (e.g., "<http://localhost:3001/api>")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
    /// Bearer token for authenticated calls
    pub auth_token: String,
}

impl Default for EcoverseApiConfig {
    fn default() -> Self {
        EndpointConfig::default().into()
    }
}

impl From<EndpointConfig> for EcoverseApiConfig {
    fn from(endpoint: EndpointConfig) -> Self {
        Self {
            base_url: endpoint.base_url,
            timeout_ms: endpoint.timeout_ms,
            auth_token: endpoint.auth_token,
        }
    }
}

/// HTTP client for EcoVerse API operations
pub struct EcoverseApiClient {
    client: Client,
    base_url: Url,
    auth_header: HeaderValue,
    config: EcoverseApiConfig,
}

impl std::fmt::Debug for EcoverseApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcoverseApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout_ms", &self.config.timeout_ms)
            .field("auth_enabled", &!self.config.auth_token.is_empty())
            .finish()
    }
}

impl EcoverseApiClient {
    /// Create new API client with the given configuration
    pub fn new(config: EcoverseApiConfig) -> ProbeResult<Self> {
        let mut base_url = Url::parse(&config.base_url).map_err(|e| {
            ProbeError::config_error(format!("Invalid base URL '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ProbeError::config_error(format!(
                "Base URL '{}' cannot carry paths",
                config.base_url
            )));
        }
        // Url::join drops the last segment unless the path ends with a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut auth_header = HeaderValue::from_str(&format!("Bearer {}", config.auth_token))
            .map_err(|e| ProbeError::config_error(format!("Invalid bearer token: {}", e)))?;
        auth_header.set_sensitive(true);

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(format!("ecoverse-probe/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ProbeError::config_error(format!("Failed to create HTTP client: {}", e))
            })?;

        info!(
            "Created EcoverseApiClient for base_url: {}, timeout: {}ms",
            base_url, config.timeout_ms
        );

        Ok(Self {
            client,
            base_url,
            auth_header,
            config,
        })
    }

    /// Get the configured timeout in milliseconds
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.config.timeout_ms
    }

    /// Resolve a path under the base URL, keeping its API prefix
    pub fn endpoint(&self, path: &str) -> ProbeResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ProbeError::invalid_input(format!("Invalid URL path '{}': {}", path, e)))
    }

    /// Join endpoint for a record; the id is percent-encoded as one path segment
    pub fn join_endpoint(&self, target: JoinTarget, id: &RecordId) -> ProbeResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ProbeError::invalid_input("Base URL cannot carry paths"))?
            .pop_if_empty()
            .extend(target.path_segments(id));
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(AUTHORIZATION, self.auth_header.clone())
    }

    /// Send a request and return the body text when the status is one of `expected`
    async fn send_expecting(
        &self,
        request: RequestBuilder,
        expected: &[u16],
    ) -> ProbeResult<(u16, String)> {
        let (status, body) = self.send(request).await?;
        if expected.contains(&status) {
            Ok((status, body))
        } else {
            warn!("Request failed: {} - {}", status, body);
            Err(ProbeError::unexpected_status(status, expected, body))
        }
    }

    async fn send(&self, request: RequestBuilder) -> ProbeResult<(u16, String)> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok((status, body))
    }

    async fn get_json<T>(&self, path: &str, authenticated: bool) -> ProbeResult<T>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);

        let mut request = self.client.get(url);
        if authenticated {
            request = self.authorized(request);
        }
        let (_, body) = self.send_expecting(request, OK).await?;
        parse_body(&body)
    }
}

#[async_trait]
impl EcoverseApi for EcoverseApiClient {
    fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    async fn health_check(&self) -> ProbeResult<()> {
        let url = self.endpoint("health")?;
        debug!("Performing backend health check: {}", url);

        self.send_expecting(self.client.get(url), OK).await?;
        info!("Backend health check passed");
        Ok(())
    }

    async fn sync_user(&self) -> ProbeResult<UserProfile> {
        let url = self.endpoint("user/sync")?;
        debug!("POST {}", url);

        let (_, body) = self
            .send_expecting(self.authorized(self.client.post(url)), OK)
            .await?;
        let profile: UserProfile = parse_body(&body)?;
        info!("Synced user {:?}", profile.email);
        Ok(profile)
    }

    async fn get_profile(&self) -> ProbeResult<UserProfile> {
        self.get_json("user/profile", true).await
    }

    async fn create_activity(
        &self,
        activity: &NewActivity,
        encoding: ActivityEncoding,
    ) -> ProbeResult<u16> {
        let url = self.endpoint("activities")?;
        debug!("POST {} ({} encoded)", url, encoding);

        let request = self.authorized(self.client.post(url));
        let request = match encoding {
            ActivityEncoding::Form => request.form(activity),
            ActivityEncoding::Json => request.json(activity),
            ActivityEncoding::Multipart => {
                let form = reqwest::multipart::Form::new()
                    .text("type", activity.kind.clone())
                    .text("title", activity.title.clone())
                    .text("description", activity.description.clone())
                    .text("co2Saved", activity.co2_saved.to_string());
                request.multipart(form)
            }
        };

        let (status, _) = self.send_expecting(request, CREATED).await?;
        info!("Created activity '{}' ({})", activity.title, status);
        Ok(status)
    }

    async fn list(&self, collection: Collection) -> ProbeResult<Vec<Value>> {
        let value: Value = self.get_json(collection.path(), true).await?;
        match value {
            Value::Array(records) => {
                info!("Retrieved {} {}", records.len(), collection.label());
                Ok(records)
            }
            other => Err(ProbeError::unexpected_shape("array", json_kind(&other))),
        }
    }

    async fn join(&self, target: JoinTarget, id: &RecordId) -> ProbeResult<JoinOutcome> {
        let url = self.join_endpoint(target, id)?;
        debug!("POST {}", url);

        let (status, body) = self.send(self.authorized(self.client.post(url))).await?;
        let outcome = target.classify(status, &body);
        match &outcome {
            Ok(JoinOutcome::Joined { status }) => {
                info!("Joined {} {} ({})", target.label(), id, status)
            }
            Ok(JoinOutcome::AlreadyJoined) => info!("{} {} already joined", target.label(), id),
            Err(e) => warn!("Join {} {} failed: {}", target.label(), id, e),
        }
        outcome
    }

    async fn api_document(&self) -> ProbeResult<Value> {
        self.get_json("docs.json", false).await
    }
}

fn parse_body<T: DeserializeOwned>(body: &str) -> ProbeResult<T> {
    serde_json::from_str(body).map_err(|e| ProbeError::MalformedBody(e.to_string()))
}
