//! Test Helpers Module
//!
//! In-memory stand-ins for the EcoVerse backend, shared by unit tests and the
//! integration tests under `tests/`.

pub mod scripted_api;

pub use scripted_api::ScriptedApi;
