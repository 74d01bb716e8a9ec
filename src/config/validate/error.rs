//! Validation error types

use podar_common::PodarError;

/// Validation error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid {0}: {1} (must be in (0.0, 1.0])")]
    InvalidFraction(&'static str, f64),

    #[error("Invalid selection probability: {0} (must be in [0.0, 1.0])")]
    InvalidProbability(f64),

    #[error("Invalid epochs: {0} (must be > 0)")]
    InvalidEpochs(usize),

    #[error("Invalid batch size: {0} (must be > 0)")]
    InvalidBatchSize(usize),

    #[error("Invalid learning rate: {0} (must be > 0.0 and <= 10.0)")]
    InvalidLearningRate(f64),

    #[error("Invalid L2 penalty: {0} (must be >= 0.0)")]
    InvalidL2(f64),

    #[error("Invalid minimum example count: {0} (must be > 0)")]
    InvalidMinExamples(usize),

    #[error("Invalid report interval: {0} (must be > 0)")]
    InvalidLogEvery(usize),

    #[error("Invalid ratio threshold: {0} (must be finite and >= 0.0)")]
    InvalidRatioThreshold(f64),

    #[error("Path for {0} cannot be empty")]
    EmptyPath(&'static str),

    #[error("Merge pattern cannot be empty")]
    EmptyPattern,

    #[error("Model-based policy has no model path")]
    MissingModelPath,
}

impl ValidationError {
    /// Config key the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidFraction(field, _) | Self::EmptyPath(field) => field,
            Self::InvalidProbability(_) => "compile.selection.probability",
            Self::InvalidEpochs(_) => "train.epochs",
            Self::InvalidBatchSize(_) => "train.batch_size",
            Self::InvalidLearningRate(_) => "train.learning_rate",
            Self::InvalidL2(_) => "train.l2",
            Self::InvalidMinExamples(_) => "train.min_examples",
            Self::InvalidLogEvery(_) => "train.log_every",
            Self::InvalidRatioThreshold(_) => "compile.ratio_threshold",
            Self::EmptyPattern => "merge.pattern",
            Self::MissingModelPath => "compile.model",
        }
    }

    /// What to change.
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::InvalidFraction(..) => "Use a fraction such as 0.15",
            Self::InvalidProbability(_) => "Use a probability such as 0.70",
            Self::InvalidEpochs(_) => "Train for at least one epoch",
            Self::InvalidBatchSize(_) => "Use a batch size such as 256",
            Self::InvalidLearningRate(_) => "Try 0.05 for batch or 0.15 for streaming training",
            Self::InvalidL2(_) => "Use 0 to disable the penalty, or a small value such as 1e-4",
            Self::InvalidMinExamples(_) => "The stock minimum is 50",
            Self::InvalidLogEvery(_) => "Report every 100 epochs, for example",
            Self::InvalidRatioThreshold(_) => "The stock rule threshold is 0.0002",
            Self::EmptyPath(_) => "Set a file path",
            Self::EmptyPattern => "Use a glob such as baseline_*.csv",
            Self::MissingModelPath => "Set compile.model or use `source: rule`",
        }
    }
}

impl From<ValidationError> for PodarError {
    fn from(err: ValidationError) -> Self {
        PodarError::ConfigValue {
            field: err.field().to_string(),
            message: err.to_string(),
            suggestion: err.suggestion().to_string(),
        }
    }
}
