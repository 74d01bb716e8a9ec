//! CLI argument parsing
//!
//! # Usage
//!
//! ```bash
//! podar merge
//! podar label --bottom-pct 0.2
//! podar train --strategy streaming --epochs 5
//! podar compile --top-fraction 0.5 --run baseline_a
//! podar run --config podar.yaml
//! ```

mod core;
mod types;


pub use self::core::{
    apply_overrides, parse_args, Cli, Command, CompileArgs, InitArgs, InspectArgs, LabelArgs, MergeArgs, RunArgs,
    TrainArgs, ValidateArgs,
};
pub use self::types::OutputFormat;
