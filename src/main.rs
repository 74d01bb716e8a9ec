//! Podar CLI
//!
//! # Usage
//!
//! ```bash
//! # Write a default configuration
//! podar init
//!
//! # Run every stage
//! podar run
//!
//! # Individual stages with overrides
//! podar merge
//! podar label --bottom-pct 0.15
//! podar train --strategy streaming --epochs 3
//! podar compile --threshold 0.7
//!
//! # Look at a trained model
//! podar inspect DATA/bvh_ml_model.json
//! ```

use clap::Parser;
use podar::cli::{run_command, Cli};
use podar_common::{init_logger, LogLevel};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(LogLevel::from_flags(cli.verbose, cli.quiet));

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error [{}]: {e}", e.code());
            ExitCode::FAILURE
        }
    }
}
