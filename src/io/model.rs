//! Serializable model state

use crate::model::{ModelMetadata, Normalizer, PolicyModel};
use serde::{Deserialize, Serialize};

/// Artifact layout version written by this crate.
pub const FORMAT_VERSION: u32 = 1;

fn default_format_version() -> u32 {
    FORMAT_VERSION
}

/// On-disk form of a [`PolicyModel`].
///
/// `mu` and `sd` are empty for models trained without normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelState {
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    pub weights: Vec<f64>,
    pub bias: f64,
    #[serde(default)]
    pub mu: Vec<f64>,
    #[serde(default)]
    pub sd: Vec<f64>,
    pub meta: ModelMetadata,
}

impl PolicyModel {
    /// Convert to serializable state.
    pub fn to_state(&self) -> ModelState {
        let (mu, sd) = match self.normalizer() {
            Some(norm) => (norm.mu().to_vec(), norm.sd().to_vec()),
            None => (Vec::new(), Vec::new()),
        };
        ModelState {
            format_version: FORMAT_VERSION,
            weights: self.weights().to_vec(),
            bias: self.bias(),
            mu,
            sd,
            meta: self.metadata().clone(),
        }
    }

    /// Rebuild from serialized state, rejecting inconsistent artifacts.
    pub fn from_state(state: ModelState) -> Result<Self, String> {
        if state.format_version > FORMAT_VERSION {
            return Err(format!(
                "format version {} is newer than supported version {FORMAT_VERSION}",
                state.format_version
            ));
        }
        let normalizer = match (state.mu.is_empty(), state.sd.is_empty()) {
            (true, true) => None,
            (false, false) => Some(Normalizer::from_parts(state.mu, state.sd)),
            _ => return Err("mu and sd must be both present or both empty".to_string()),
        };
        PolicyModel::new(state.weights, state.bias, normalizer, state.meta)
    }
}
