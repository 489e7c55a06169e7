//! # Probe Report
//!
//! Per-step outcomes of a run, their summary, and table/JSON rendering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::str::FromStr;
use uuid::Uuid;

use super::steps::StepId;
use crate::error::{ProbeError, ProbeResult};

/// What happened to a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Passed { detail: String },
    Failed { reason: String },
    Skipped { reason: String },
}

impl StepOutcome {
    fn icon(&self) -> &'static str {
        match self {
            StepOutcome::Passed { .. } => "✓",
            StepOutcome::Failed { .. } => "✗",
            StepOutcome::Skipped { .. } => "-",
        }
    }

    fn message(&self) -> &str {
        match self {
            StepOutcome::Passed { detail } => detail,
            StepOutcome::Failed { reason } | StepOutcome::Skipped { reason } => reason,
        }
    }
}

/// One executed (or skipped) step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: StepId,
    #[serde(flatten)]
    pub outcome: StepOutcome,
    pub elapsed_ms: u64,
}

/// Outcome counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total: usize,
}

/// Full record of a probe run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
    pub run_id: Uuid,
    pub base_url: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Health probes needed before the backend answered
    pub readiness_attempts: u32,
    pub steps: Vec<StepRecord>,
}

impl ProbeReport {
    pub fn summary(&self) -> ReportSummary {
        self.steps
            .iter()
            .fold(ReportSummary::default(), |mut summary, record| {
                match record.outcome {
                    StepOutcome::Passed { .. } => summary.passed += 1,
                    StepOutcome::Failed { .. } => summary.failed += 1,
                    StepOutcome::Skipped { .. } => summary.skipped += 1,
                }
                summary.total += 1;
                summary
            })
    }

    pub fn is_success(&self) -> bool {
        self.summary().failed == 0
    }

    pub fn outcome_of(&self, step: StepId) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|record| record.step == step)
            .map(|record| &record.outcome)
    }

    /// Turn a report with failed steps into [`ProbeError::StepsFailed`]
    pub fn into_result(self) -> ProbeResult<Self> {
        let summary = self.summary();
        if summary.failed == 0 {
            Ok(self)
        } else {
            Err(ProbeError::StepsFailed {
                failed: summary.failed,
                total: summary.total,
            })
        }
    }

    pub fn render_table(&self) -> String {
        let mut out = String::new();
        let width = self
            .steps
            .iter()
            .map(|record| record.step.name().len())
            .max()
            .unwrap_or(0);

        let _ = writeln!(out, "Probe run {} against {}", self.run_id, self.base_url);
        let _ = writeln!(
            out,
            "Backend ready after {} attempt(s)",
            self.readiness_attempts
        );
        for record in &self.steps {
            let _ = writeln!(
                out,
                "  {} {:<width$}  {:>5}ms  {}",
                record.outcome.icon(),
                record.step.name(),
                record.elapsed_ms,
                record.outcome.message(),
                width = width
            );
        }

        let summary = self.summary();
        let _ = writeln!(
            out,
            "{} passed, {} failed, {} skipped ({} steps, {}ms)",
            summary.passed,
            summary.failed,
            summary.skipped,
            summary.total,
            (self.finished_at - self.started_at).num_milliseconds()
        );
        out
    }

    pub fn to_json(&self) -> ProbeResult<String> {
        #[derive(Serialize)]
        struct Rendered<'a> {
            #[serde(flatten)]
            report: &'a ProbeReport,
            summary: ReportSummary,
        }

        Ok(serde_json::to_string_pretty(&Rendered {
            report: self,
            summary: self.summary(),
        })?)
    }
}

/// Report output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl OutputFormat {
    pub fn render(self, report: &ProbeReport) -> ProbeResult<String> {
        match self {
            OutputFormat::Table => Ok(report.render_table()),
            OutputFormat::Json => report.to_json(),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => Err(ProbeError::invalid_input(format!(
                "Unknown output format '{other}' (expected table or json)"
            ))),
        }
    }
}
