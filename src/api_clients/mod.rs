//! API Client Modules
//!
//! HTTP client for the EcoVerse backend, behind the [`EcoverseApi`] trait so
//! probe steps can run against either the real client or a test double.

pub mod ecoverse_client;

pub use ecoverse_client::{EcoverseApi, EcoverseApiClient, EcoverseApiConfig};
