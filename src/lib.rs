#![allow(clippy::doc_markdown)] // Allow technical terms like OpenAPI, EcoVerse in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # EcoVerse API Probe
//!
//! Sequential black-box probe for the EcoVerse backend REST API.
//!
//! ## Overview
//!
//! The probe waits for the backend's health endpoint, then runs a fixed,
//! ordered sequence of checks: account sync and profile, activity creation and
//! listing, mission/shop/tour/circle listings, and mission/circle joins.
//! Identifiers captured by a listing feed the dependent join; a repeated join
//! answered with "already joined" counts as success.
//!
//! ## Module Organization
//!
//! - [`config`] - Layered configuration (defaults, TOML file, environment)
//! - [`api_clients`] - The [`EcoverseApi`] trait and its reqwest client
//! - [`probe`] - Readiness wait, step catalogue, runner and report
//! - [`types`] - Wire types shared by the client and the steps
//! - [`error`] - Structured error handling
//! - [`logging`] - Tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ecoverse_probe::{EcoverseApiClient, ProbeConfig, ProbeRunner, ProbeSettings};
//!
//! # async fn example() -> ecoverse_probe::ProbeResult<()> {
//! let config = ProbeConfig::load()?;
//! config.validate()?;
//! let client = EcoverseApiClient::new(config.endpoint.clone().into())?;
//! let runner = ProbeRunner::new(client, ProbeSettings::from_config(&config));
//!
//! let report = runner.run().await?;
//! println!("{}", report.render_table());
//! # Ok(())
//! # }
//! ```

pub mod api_clients;
pub mod config;
pub mod error;
pub mod logging;
pub mod probe;
pub mod test_helpers;
pub mod types;

pub use api_clients::{EcoverseApi, EcoverseApiClient, EcoverseApiConfig};
pub use config::ProbeConfig;
pub use error::{ProbeError, ProbeResult};
pub use probe::{OutputFormat, ProbeReport, ProbeRunner, ProbeSettings, StepId, StepSelection};
