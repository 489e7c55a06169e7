//! # Probe Runner
//!
//! Waits for the backend, then executes the planned steps strictly in order.
//! A failing step is recorded and the run moves on; only readiness failure
//! (or another fatal error) aborts the run.

use chrono::Utc;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use super::context::RunContext;
use super::readiness::{wait_for_backend, ReadinessPolicy};
use super::report::{ProbeReport, StepOutcome, StepRecord};
use super::steps::{self, StepInputs, StepOutput, StepSelection};
use crate::api_clients::EcoverseApi;
use crate::config::ProbeConfig;
use crate::error::ProbeResult;

/// Everything a run needs besides the API client
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub readiness: ReadinessPolicy,
    pub inputs: StepInputs,
    pub selection: StepSelection,
}

impl ProbeSettings {
    pub fn from_config(config: &ProbeConfig) -> Self {
        Self {
            readiness: (&config.readiness).into(),
            inputs: StepInputs {
                expected_email: config.fixtures.expected_email.clone(),
                activity: config.activity.payload(),
                encoding: config.activity.encoding,
            },
            selection: StepSelection {
                extended: config.probe.extended,
                ..Default::default()
            },
        }
    }

    #[must_use]
    pub fn with_selection(mut self, selection: StepSelection) -> Self {
        self.selection = selection;
        self
    }
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self::from_config(&ProbeConfig::default())
    }
}

/// Sequential probe over an [`EcoverseApi`]
#[derive(Debug)]
pub struct ProbeRunner<A> {
    api: A,
    settings: ProbeSettings,
}

impl<A: EcoverseApi> ProbeRunner<A> {
    pub fn new(api: A, settings: ProbeSettings) -> Self {
        Self { api, settings }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    /// Execute readiness plus every planned step.
    ///
    /// Returns `Err` only for fatal errors; failed steps are reported in the
    /// returned [`ProbeReport`].
    pub async fn run(&self) -> ProbeResult<ProbeReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%run_id, base_url = %self.api.base_url(), "Starting API probe");

        let readiness_attempts = wait_for_backend(&self.api, &self.settings.readiness).await?;

        let mut context = RunContext::default();
        let mut records = Vec::new();

        for (step, enabled) in self.settings.selection.plan() {
            let started = Instant::now();

            let outcome = if !enabled {
                StepOutcome::Skipped {
                    reason: "filtered out".to_string(),
                }
            } else {
                let captured = step.joins().and_then(|target| context.id_for(target));

                match steps::execute(step, &self.api, &self.settings.inputs, captured).await {
                    Ok(StepOutput::Passed { detail, captured }) => {
                        if let Some((target, id)) = captured {
                            context.capture(target, id);
                        }
                        info!(%step, "{}", detail);
                        StepOutcome::Passed { detail }
                    }
                    Ok(StepOutput::Skipped { reason }) => {
                        info!(%step, "Skipped: {}", reason);
                        StepOutcome::Skipped { reason }
                    }
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        warn!(%step, error = %e, "Probe step failed");
                        StepOutcome::Failed {
                            reason: e.to_string(),
                        }
                    }
                }
            };

            records.push(StepRecord {
                step,
                outcome,
                elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            });
        }

        let report = ProbeReport {
            run_id,
            base_url: self.api.base_url().to_string(),
            started_at,
            finished_at: Utc::now(),
            readiness_attempts,
            steps: records,
        };

        let summary = report.summary();
        info!(
            %run_id,
            passed = summary.passed,
            failed = summary.failed,
            skipped = summary.skipped,
            "API probe finished"
        );
        Ok(report)
    }
}
