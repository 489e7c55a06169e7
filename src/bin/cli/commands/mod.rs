//! Command handlers for the EcoVerse probe CLI

pub mod config;
pub mod health;
pub mod run;
pub mod steps;

pub use config::{handle_config_init, handle_config_show};
pub use health::handle_health_command;
pub use run::handle_run_command;
pub use steps::handle_steps_command;
