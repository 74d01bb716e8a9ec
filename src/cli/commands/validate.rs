//! Validate command implementation

use crate::compile::TableLayout;
use crate::config::{load_config, validate_config, PipelineConfig, PolicySourceKind, ValidateArgs};
use podar_common::{say, LogLevel, Result};
use std::path::Path;

/// Format merge configuration as a string
pub fn format_merge_info(config: &PipelineConfig) -> String {
    let merge = &config.merge;
    format!(
        "  Merge:\n    Runs: {}/{}\n    Output: {}",
        merge.input_dir.display(),
        merge.pattern,
        merge.output.display()
    )
}

/// Format label configuration as a string
pub fn format_label_info(config: &PipelineConfig) -> String {
    let labels = &config.labels;
    let mut lines = vec![
        "  Labels:".to_string(),
        format!("    Input: {}", labels.input.display()),
        format!("    Output: {}", labels.output.display()),
    ];
    match &labels.policy {
        Some(policy) => lines.push(format!("    From policy: {}", policy.display())),
        None => lines.push(format!("    Bottom fraction: {}", labels.bottom_pct)),
    }
    lines.push(format!("    Min visits: {}", labels.min_visits));
    if let Some(max_depth) = labels.max_depth {
        lines.push(format!("    Max depth: {max_depth}"));
    }
    lines.join("\n")
}

/// Format training configuration as a string
pub fn format_train_info(config: &PipelineConfig) -> String {
    let train = &config.train;
    let strategy = train.strategy;
    let features = train.features.unwrap_or_else(|| strategy.default_features());
    let epochs = train.epochs.unwrap_or_else(|| strategy.default_epochs());
    let lr = train.learning_rate.unwrap_or_else(|| strategy.default_learning_rate());
    let mut lines = vec![
        "  Train:".to_string(),
        format!("    Strategy: {strategy}"),
        format!("    Features: {features}"),
        format!("    Epochs: {epochs}"),
        format!("    Learning rate: {lr}"),
        format!("    L2: {}", train.l2),
    ];
    if strategy == crate::model::TrainStrategy::Batch {
        lines.push(format!("    Batch size: {}", train.batch_size));
        lines.push(format!("    Seed: {}", train.seed));
    }
    lines.push(format!("    Floors: depth > {}, visits >= {}", train.keep_depth, train.min_visits));
    lines.push(format!("    Output: {}", train.output.display()));
    lines.join("\n")
}

/// Format compile configuration as a string
pub fn format_compile_info(config: &PipelineConfig) -> String {
    let compile = &config.compile;
    let mut lines = vec!["  Compile:".to_string(), format!("    Baseline: {}", compile.baseline.display())];
    match compile.source {
        PolicySourceKind::Model => {
            if let Some(model) = &compile.model {
                lines.push(format!("    Model: {}", model.display()));
            }
            lines.push(format!("    Selection: {}", compile.selection));
        }
        PolicySourceKind::Rule => lines.push(format!("    Rule: ratio < {}", compile.ratio_threshold)),
    }
    lines.push(format!("    Floors: depth > {}, visits >= {}", compile.keep_depth, compile.min_visits));
    let layout = match compile.table {
        TableLayout::Sparse => "sparse",
        TableLayout::Full => "full",
    };
    lines.push(format!("    Table: {layout}"));
    if let Some(run) = &compile.run_id {
        lines.push(format!("    Run: {run}"));
    }
    lines.push(format!("    Output: {}", compile.output.display()));
    lines.join("\n")
}

/// Print detailed configuration summary
pub fn print_detailed_summary(config: &PipelineConfig) {
    println!();
    println!("Configuration Summary:");
    println!("{}", format_merge_info(config));
    println!("{}", format_label_info(config));
    println!("{}", format_train_info(config));
    println!("{}", format_compile_info(config));
}

pub fn run_validate(config_path: Option<&Path>, args: &ValidateArgs, level: LogLevel) -> Result<()> {
    let shown = config_path.map_or_else(|| "podar.yaml (or defaults)".to_string(), |p| p.display().to_string());
    say(level, LogLevel::Normal, &format!("Validating config: {shown}"));

    let config = load_config(config_path)?;
    validate_config(&config)?;

    say(level, LogLevel::Normal, "Configuration is valid");

    if args.detailed && level != LogLevel::Quiet {
        print_detailed_summary(&config);
    }

    Ok(())
}
