//! Inspect command implementation

use crate::config::{InspectArgs, OutputFormat};
use crate::io::load_model;
use crate::model::PolicyModel;
use podar_common::{LogLevel, Result};

/// Human-readable model description
pub fn format_model(model: &PolicyModel) -> String {
    let meta = model.metadata();
    let hyper = &meta.hyperparameters;
    let mut lines = vec![
        format!("Strategy: {}", meta.strategy),
        format!("Feature set: {}", meta.feature_set),
        "Weights:".to_string(),
    ];
    for (i, (name, weight)) in meta.features.iter().zip(model.weights()).enumerate() {
        let norm = model
            .normalizer()
            .map(|n| format!("  (mu {:.6}, sd {:.6})", n.mu()[i], n.sd()[i]))
            .unwrap_or_default();
        lines.push(format!("  {name:<18} {weight:>14.6}{norm}"));
    }
    lines.push(format!("  {:<18} {:>14.6}", "bias", model.bias()));
    lines.push(format!(
        "Hyperparameters: epochs {}, lr {}, l2 {}, floors depth > {} visits >= {}",
        hyper.epochs, hyper.learning_rate, hyper.l2, hyper.keep_depth, hyper.min_visits
    ));
    if let Some(pos_weight) = hyper.pos_weight {
        lines.push(format!("Positive weight: {pos_weight:.4}"));
    }
    if let Some(p) = &meta.provenance {
        lines.push(format!("Trained: {} by podar {}", p.trained_at.to_rfc3339(), p.crate_version));
        lines.push(format!(
            "Labels: {} (sha256 {}), {} examples ({} prunable, {} kept)",
            p.labels_path, p.labels_sha256, p.examples, p.positives, p.negatives
        ));
    }
    lines.join("\n")
}

/// Print a model artifact. Output is the point of this command, so it is
/// printed even under `--quiet`.
pub fn run_inspect(args: &InspectArgs, _level: LogLevel) -> Result<()> {
    let model = load_model(&args.model)?;
    let text = match args.format {
        OutputFormat::Text => format_model(&model),
        OutputFormat::Json => serde_json::to_string_pretty(&model.to_state())?,
        OutputFormat::Yaml => serde_yaml::to_string(&model.to_state())?,
    };
    println!("{}", text.trim_end());
    Ok(())
}
