//! # Probe
//!
//! Ordered backend checks: a bounded readiness wait followed by the step
//! catalogue in [`steps`], executed by [`runner::ProbeRunner`] and summarised
//! in a [`report::ProbeReport`].

pub mod context;
pub mod readiness;
pub mod report;
pub mod runner;
pub mod steps;

pub use context::RunContext;
pub use readiness::{wait_for_backend, ReadinessPolicy};
pub use report::{OutputFormat, ProbeReport, ReportSummary, StepOutcome, StepRecord};
pub use runner::{ProbeRunner, ProbeSettings};
pub use steps::{StepId, StepOutput, StepSelection};
