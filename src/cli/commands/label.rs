//! Label command implementation

use crate::config::{resolve_config, Command};
use crate::labels::{label_file, LabelMode, LabelSummary};
use podar_common::{say, LogLevel, Result};
use std::path::Path;

pub fn format_label_summary(summary: &LabelSummary) -> String {
    let pct = if summary.labels == 0 {
        0.0
    } else {
        100.0 * summary.positives as f64 / summary.labels as f64
    };
    let mut text = format!(
        "Wrote {} labels over {} run(s), {} prunable ({pct:.1}%) -> {}",
        summary.labels,
        summary.runs,
        summary.positives,
        summary.output.display()
    );
    if summary.skipped_rows > 0 {
        text.push_str(&format!("\n  Skipped {} malformed row(s)", summary.skipped_rows));
    }
    text
}

pub fn run_label(config: Option<&Path>, command: &Command, level: LogLevel) -> Result<()> {
    let config = resolve_config(config, command)?;
    let labels = &config.labels;
    let mode = labels.mode();
    if let LabelMode::Policy(path) = &mode {
        say(level, LogLevel::Verbose, &format!("Copying labels from policy {}", path.display()));
    }

    let summary = label_file(&labels.input, &labels.output, &mode, &labels.settings())?;
    say(level, LogLevel::Normal, &format_label_summary(&summary));
    Ok(())
}
