//! Configuration validation logic

use super::error::ValidationError;
use crate::compile::Selection;
use crate::config::schema::{PipelineConfig, PolicySourceKind};
use std::path::Path;

fn valid_fraction(value: f64) -> bool {
    value > 0.0 && value <= 1.0
}

fn require_path(field: &'static str, path: &Path) -> Result<(), ValidationError> {
    if path.as_os_str().is_empty() {
        return Err(ValidationError::EmptyPath(field));
    }
    Ok(())
}

/// Validate a pipeline configuration
///
/// Only value ranges are checked here. Input files are checked by the stage
/// that reads them, since earlier stages may not have produced them yet.
pub fn validate_config(config: &PipelineConfig) -> Result<(), ValidationError> {
    let merge = &config.merge;
    require_path("merge.input_dir", &merge.input_dir)?;
    require_path("merge.output", &merge.output)?;
    if merge.pattern.trim().is_empty() {
        return Err(ValidationError::EmptyPattern);
    }

    let labels = &config.labels;
    require_path("labels.input", &labels.input)?;
    require_path("labels.output", &labels.output)?;
    if !valid_fraction(labels.bottom_pct) {
        return Err(ValidationError::InvalidFraction("labels.bottom_pct", labels.bottom_pct));
    }
    if let Some(policy) = &labels.policy {
        require_path("labels.policy", policy)?;
    }

    let train = &config.train;
    require_path("train.labels", &train.labels)?;
    require_path("train.output", &train.output)?;
    if let Some(epochs) = train.epochs {
        if epochs == 0 {
            return Err(ValidationError::InvalidEpochs(epochs));
        }
    }
    if let Some(lr) = train.learning_rate {
        if !(lr > 0.0 && lr <= 10.0) {
            return Err(ValidationError::InvalidLearningRate(lr));
        }
    }
    if train.batch_size == 0 {
        return Err(ValidationError::InvalidBatchSize(train.batch_size));
    }
    if !(train.l2 >= 0.0 && train.l2.is_finite()) {
        return Err(ValidationError::InvalidL2(train.l2));
    }
    if train.min_examples == 0 {
        return Err(ValidationError::InvalidMinExamples(train.min_examples));
    }
    if train.log_every == 0 {
        return Err(ValidationError::InvalidLogEvery(train.log_every));
    }

    let compile = &config.compile;
    require_path("compile.baseline", &compile.baseline)?;
    require_path("compile.output", &compile.output)?;
    match compile.selection {
        Selection::Threshold { probability } if !(0.0..=1.0).contains(&probability) => {
            return Err(ValidationError::InvalidProbability(probability));
        }
        Selection::TopFraction { fraction } if !valid_fraction(fraction) => {
            return Err(ValidationError::InvalidFraction("compile.selection.fraction", fraction));
        }
        _ => {}
    }
    if !(compile.ratio_threshold >= 0.0 && compile.ratio_threshold.is_finite()) {
        return Err(ValidationError::InvalidRatioThreshold(compile.ratio_threshold));
    }
    if compile.source == PolicySourceKind::Model {
        match &compile.model {
            None => return Err(ValidationError::MissingModelPath),
            Some(path) => require_path("compile.model", path)?,
        }
    }

    Ok(())
}
