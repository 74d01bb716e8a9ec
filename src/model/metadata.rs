//! Model metadata: feature definition, hyperparameters and provenance

use crate::features::FeatureSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Training strategy that produced a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainStrategy {
    /// Normalized mini-batch gradient descent, data held in memory
    #[default]
    Batch,
    /// Per-record SGD re-reading the label file every epoch
    Streaming,
}

impl TrainStrategy {
    /// Feature set used when none is configured
    pub fn default_features(self) -> FeatureSet {
        match self {
            Self::Batch => FeatureSet::LogitRatio,
            Self::Streaming => FeatureSet::UsefulRate,
        }
    }

    pub fn default_epochs(self) -> usize {
        match self {
            Self::Batch => 2000,
            Self::Streaming => 3,
        }
    }

    pub fn default_learning_rate(self) -> f64 {
        match self {
            Self::Batch => 0.05,
            Self::Streaming => 0.15,
        }
    }
}

impl fmt::Display for TrainStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Batch => write!(f, "batch"),
            Self::Streaming => write!(f, "streaming"),
        }
    }
}

impl std::str::FromStr for TrainStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "batch" => Ok(Self::Batch),
            "streaming" | "stream" => Ok(Self::Streaming),
            other => Err(format!("unknown strategy '{other}' (expected batch or streaming)")),
        }
    }
}

/// Hyperparameters recorded with a trained model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    pub epochs: usize,
    pub learning_rate: f64,
    pub l2: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Depth floor applied to training examples
    pub keep_depth: u32,
    /// Visit floor applied to training examples
    pub min_visits: u64,
    /// Weight on positive examples in the loss (batch only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos_weight: Option<f64>,
}

/// Where a model came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub labels_path: String,
    pub labels_sha256: String,
    pub trained_at: DateTime<Utc>,
    pub examples: usize,
    pub positives: usize,
    pub negatives: usize,
    pub crate_version: String,
}

/// Everything needed to rebuild feature vectors and audit a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Feature names in weight order
    pub features: Vec<String>,
    pub feature_set: FeatureSet,
    pub strategy: TrainStrategy,
    pub hyperparameters: Hyperparameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
}

impl ModelMetadata {
    pub fn new(feature_set: FeatureSet, strategy: TrainStrategy, hyperparameters: Hyperparameters) -> Self {
        Self {
            features: feature_set.names().iter().map(|s| (*s).to_string()).collect(),
            feature_set,
            strategy,
            hyperparameters,
            provenance: None,
        }
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = Some(provenance);
        self
    }
}
