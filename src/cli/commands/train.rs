//! Train command implementation

use crate::config::{resolve_config, Command};
use crate::train::{train_from_config, TrainSummary};
use podar_common::{say, LogLevel, Result};
use std::path::Path;

pub fn format_train_summary(summary: &TrainSummary) -> String {
    let mut lines = vec![
        format!("Trained {} model -> {}", summary.strategy, summary.output.display()),
        format!(
            "  Examples: {} ({} prunable, {} kept)",
            summary.examples,
            summary.positives,
            summary.examples - summary.positives
        ),
    ];
    if let Some(report) = &summary.final_report {
        lines.push(format!("  Final: {report}"));
    }
    if summary.skipped_rows > 0 {
        lines.push(format!("  Skipped {} malformed row(s)", summary.skipped_rows));
    }
    lines.join("\n")
}

pub fn run_train(config: Option<&Path>, command: &Command, level: LogLevel) -> Result<()> {
    let config = resolve_config(config, command)?;
    say(
        level,
        LogLevel::Verbose,
        &format!("Training {} on {}", config.train.strategy, config.train.labels.display()),
    );

    let (_, summary) = train_from_config(&config.train)?;
    say(level, LogLevel::Normal, &format_train_summary(&summary));
    Ok(())
}
