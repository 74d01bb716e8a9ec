//! Feature extraction
//!
//! Maps node statistics to fixed-length vectors. The feature set is named in
//! every model artifact so scoring always rebuilds vectors exactly as training
//! did. Records that fail the eligibility floors never become vectors.

use crate::data::NodeStats;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Distance kept from 0 and 1 before taking the logit of a ratio.
pub const RATIO_EPS: f64 = 1e-9;

/// Named, ordered feature definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSet {
    /// `depth, ln(visits+1), ln(useful+1), ratio, logit(ratio)`
    LogitRatio,
    /// `depth, ln(visits+1), ratio, useful/(1+visits)`
    UsefulRate,
}

impl FeatureSet {
    /// Feature names in vector order.
    pub fn names(self) -> &'static [&'static str] {
        match self {
            Self::LogitRatio => &["depth", "log_visits", "log_useful", "ratio", "logit_ratio"],
            Self::UsefulRate => &["depth", "log1p_visits", "ratio", "useful_per_visit"],
        }
    }

    /// Vector length.
    pub fn len(self) -> usize {
        self.names().len()
    }

    /// Always false; every set has at least one feature.
    pub fn is_empty(self) -> bool {
        false
    }

    /// Encode one record. Performs no eligibility check.
    pub fn encode(self, stats: &impl NodeStats) -> Vec<f64> {
        let depth = f64::from(stats.depth());
        let visits = stats.visits() as f64;
        let useful = stats.useful() as f64;
        let ratio = stats.ratio();
        match self {
            Self::LogitRatio => vec![depth, visits.ln_1p(), useful.ln_1p(), ratio, stable_logit(ratio)],
            Self::UsefulRate => vec![depth, visits.ln_1p(), ratio, useful / (1.0 + visits)],
        }
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LogitRatio => write!(f, "logit_ratio"),
            Self::UsefulRate => write!(f, "useful_rate"),
        }
    }
}

/// `ln(r / (1 - r))` with `r` clamped into `[RATIO_EPS, 1 - RATIO_EPS]`.
pub fn stable_logit(ratio: f64) -> f64 {
    let r = ratio.clamp(RATIO_EPS, 1.0 - RATIO_EPS);
    (r / (1.0 - r)).ln()
}

/// Depth and visit floors a node must clear to be trained on or scored.
///
/// The root is never eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eligibility {
    /// Nodes at or above this depth are always kept
    pub keep_depth: u32,
    /// Minimum traversal count
    pub min_visits: u64,
}

impl Eligibility {
    pub fn new(keep_depth: u32, min_visits: u64) -> Self {
        Self { keep_depth, min_visits }
    }

    pub fn admits(&self, stats: &impl NodeStats) -> bool {
        !stats.is_root() && stats.depth() > self.keep_depth && stats.visits() >= self.min_visits
    }
}

/// Feature set plus the floors that gate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureExtractor {
    pub set: FeatureSet,
    pub eligibility: Eligibility,
}

impl FeatureExtractor {
    pub fn new(set: FeatureSet, eligibility: Eligibility) -> Self {
        Self { set, eligibility }
    }

    /// Feature vector for an eligible record, `None` otherwise.
    pub fn extract(&self, stats: &impl NodeStats) -> Option<Vec<f64>> {
        self.eligibility.admits(stats).then(|| self.set.encode(stats))
    }

    /// Vector length.
    pub fn width(&self) -> usize {
        self.set.len()
    }
}
