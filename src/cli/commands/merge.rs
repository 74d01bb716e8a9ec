//! Merge command implementation

use crate::config::{resolve_config, Command};
use crate::data::{merge_directory, MergeSummary};
use podar_common::{say, LogLevel, Result};
use std::path::Path;

/// Format per-run row counts as a string
pub fn format_merge_summary(summary: &MergeSummary) -> String {
    let mut lines = vec![format!(
        "Merged {} run(s), {} rows -> {}",
        summary.runs.len(),
        summary.rows,
        summary.output.display()
    )];
    for (run, rows) in &summary.runs {
        lines.push(format!("  {run}: {rows} rows"));
    }
    lines.join("\n")
}

pub fn run_merge(config: Option<&Path>, command: &Command, level: LogLevel) -> Result<()> {
    let config = resolve_config(config, command)?;
    let merge = &config.merge;
    say(
        level,
        LogLevel::Verbose,
        &format!("Searching {} for {}", merge.input_dir.display(), merge.pattern),
    );

    let summary = merge_directory(&merge.input_dir, &merge.pattern, &merge.output)?;
    say(level, LogLevel::Normal, &format_merge_summary(&summary));
    Ok(())
}
