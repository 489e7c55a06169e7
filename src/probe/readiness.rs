//! Bounded readiness poll against the health endpoint.

use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::api_clients::EcoverseApi;
use crate::config::ReadinessConfig;
use crate::error::{ProbeError, ProbeResult};

/// How often and how long to poll before giving up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub max_attempts: u32,
    pub retry_interval: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        (&ReadinessConfig::default()).into()
    }
}

impl From<&ReadinessConfig> for ReadinessPolicy {
    fn from(config: &ReadinessConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            retry_interval: config.retry_interval(),
        }
    }
}

/// Poll the health endpoint until it answers 200.
///
/// Transport errors and non-200 statuses both consume an attempt. The delay is
/// applied between attempts only. Returns the number of attempts used, or
/// [`ProbeError::BackendUnreachable`] once every attempt has failed.
pub async fn wait_for_backend<A>(api: &A, policy: &ReadinessPolicy) -> ProbeResult<u32>
where
    A: EcoverseApi + ?Sized,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=max_attempts {
        match api.health_check().await {
            Ok(()) => {
                info!(attempt, "Backend is up and running");
                return Ok(attempt);
            }
            Err(e) => {
                info!("Waiting for backend... ({}/{}): {}", attempt, max_attempts, e);
                last_error = e.to_string();
            }
        }

        if attempt < max_attempts {
            sleep(policy.retry_interval).await;
        }
    }

    let url = format!("{}health", api.base_url());
    warn!(%url, attempts = max_attempts, "Backend is not reachable");
    Err(ProbeError::BackendUnreachable {
        url,
        attempts: max_attempts,
        last_error,
    })
}
