//! CLI module for the EcoVerse probe
//!
//! Command handlers, one file per command.

pub mod commands;

pub use commands::{
    handle_config_init, handle_config_show, handle_health_command, handle_run_command,
    handle_steps_command,
};
