//! The learned pruning classifier
//!
//! A logistic regression over one [`FeatureSet`]. Batch-trained models carry
//! the normalization statistics they were fitted with; streaming models work on
//! raw features and have none.

mod metadata;
mod normalize;

pub use metadata::{Hyperparameters, ModelMetadata, Provenance, TrainStrategy};
pub use normalize::{Normalizer, SD_FLOOR};

use crate::data::NodeStats;
use crate::features::FeatureSet;

/// Numerically stable logistic function.
///
/// Branches on sign so the exponential never overflows.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Trained logistic-regression pruning model.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyModel {
    weights: Vec<f64>,
    bias: f64,
    normalizer: Option<Normalizer>,
    metadata: ModelMetadata,
}

impl PolicyModel {
    /// Assemble a model, checking that every vector matches the feature set.
    pub fn new(
        weights: Vec<f64>,
        bias: f64,
        normalizer: Option<Normalizer>,
        metadata: ModelMetadata,
    ) -> Result<Self, String> {
        let width = metadata.feature_set.len();
        if weights.len() != width {
            return Err(format!(
                "{} weights for feature set '{}' of width {width}",
                weights.len(),
                metadata.feature_set
            ));
        }
        if metadata.features.len() != width
            || metadata.features.iter().zip(metadata.feature_set.names()).any(|(a, b)| a != b)
        {
            return Err(format!(
                "feature names {:?} do not match feature set '{}' {:?}",
                metadata.features,
                metadata.feature_set,
                metadata.feature_set.names()
            ));
        }
        if let Some(norm) = &normalizer {
            if norm.mu().len() != width || norm.sd().len() != width {
                return Err(format!(
                    "normalization has {} means and {} deviations, expected {width}",
                    norm.mu().len(),
                    norm.sd().len()
                ));
            }
        }
        if !bias.is_finite() || weights.iter().any(|w| !w.is_finite()) {
            return Err("non-finite weight or bias".to_string());
        }
        Ok(Self { weights, bias, normalizer, metadata })
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn normalizer(&self) -> Option<&Normalizer> {
        self.normalizer.as_ref()
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut ModelMetadata {
        &mut self.metadata
    }

    pub fn feature_set(&self) -> FeatureSet {
        self.metadata.feature_set
    }

    /// Linear score of a raw feature vector.
    pub fn logit(&self, features: &[f64]) -> f64 {
        let dot: f64 = match &self.normalizer {
            Some(norm) => {
                let mut x = features.to_vec();
                norm.apply(&mut x);
                x.iter().zip(&self.weights).map(|(x, w)| x * w).sum()
            }
            None => features.iter().zip(&self.weights).map(|(x, w)| x * w).sum(),
        };
        dot + self.bias
    }

    /// Pruning probability of a raw feature vector.
    pub fn probability(&self, features: &[f64]) -> f64 {
        sigmoid(self.logit(features))
    }

    /// Pruning probability of a node, ignoring eligibility floors.
    pub fn score(&self, stats: &impl NodeStats) -> f64 {
        self.probability(&self.feature_set().encode(stats))
    }
}
