//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing and subcommand handlers.

mod args;
mod commands;

pub use args::{Args, Command, ConfigAction, FrameArgs};
pub use commands::{
    handle_config_action, run_export, run_listen, run_replay, storage_root, write_default_config,
    CommandError, ReplaySummary,
};
