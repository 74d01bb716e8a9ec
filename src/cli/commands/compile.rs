//! Compile command implementation

use crate::compile::{compile_from_config, CompileReport};
use crate::config::{resolve_config, Command, CompileConfig, PolicySourceKind};
use podar_common::{say, LogLevel, Result};
use std::path::Path;

pub fn format_compile_report(config: &CompileConfig, report: &CompileReport) -> String {
    let source = match config.source {
        PolicySourceKind::Model => format!("model ({})", config.selection),
        PolicySourceKind::Rule => format!("rule (ratio < {})", config.ratio_threshold),
    };
    let summary = &report.summary;
    let mut lines = vec![
        format!("Compiled policy from {source} -> {}", report.output.display()),
        format!(
            "  Nodes: {}, scored: {}, pruned: {}",
            summary.nodes, summary.scored, summary.pruned
        ),
    ];
    if let Some(cutoff) = summary.cutoff {
        lines.push(format!("  Score cut-off: {cutoff:.4}"));
    }
    lines.push(format!("  Sidecar: {}", report.sidecar.display()));
    lines.join("\n")
}

pub fn run_compile(config: Option<&Path>, command: &Command, level: LogLevel) -> Result<()> {
    let config = resolve_config(config, command)?;
    let report = compile_from_config(&config.compile)?;
    say(level, LogLevel::Normal, &format_compile_report(&config.compile, &report));
    Ok(())
}
