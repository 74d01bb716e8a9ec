//! Run command: the full pipeline

use super::compile::format_compile_report;
use super::label::format_label_summary;
use super::merge::format_merge_summary;
use super::train::format_train_summary;
use crate::config::{resolve_config, Command};
use crate::pipeline::Pipeline;
use podar_common::{say, LogLevel, Result};
use std::path::Path;

pub fn run_pipeline(config: Option<&Path>, command: &Command, level: LogLevel) -> Result<()> {
    let config = resolve_config(config, command)?;
    let pipeline = Pipeline::new(config);
    let result = pipeline.execute()?;

    say(level, LogLevel::Normal, &format_merge_summary(&result.merge));
    say(level, LogLevel::Normal, &format_label_summary(&result.labels));
    say(level, LogLevel::Normal, &format_train_summary(&result.train));
    say(level, LogLevel::Normal, &format_compile_report(&pipeline.config().compile, &result.compile));
    say(level, LogLevel::Normal, &format!("Pipeline finished in {:.2}s", result.duration_seconds));
    Ok(())
}
