//! CLI command handlers for the podar binary.

mod commands;

pub use commands::run_command;

pub use crate::config::Cli;
pub use podar_common::LogLevel;
