//! YAML schema for `podar.yaml`
//!
//! One section per pipeline stage. Every field has a default, so an empty
//! document (or no document at all) describes the stock pipeline.

use crate::compile::{Selection, TableLayout};
use crate::features::FeatureSet;
use crate::labels::{LabelMode, LabelSettings};
use crate::model::TrainStrategy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub merge: MergeConfig,
    pub labels: LabelConfig,
    pub train: TrainConfig,
    pub compile: CompileConfig,
}

/// Run merger settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeConfig {
    /// Directory holding the per-run statistics files
    pub input_dir: PathBuf,
    /// Glob matched inside `input_dir`
    pub pattern: String,
    pub output: PathBuf,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("DATASET"),
            pattern: "baseline_*.csv".to_string(),
            output: PathBuf::from("DATASET/baseline_merged.csv"),
        }
    }
}

/// Label deriver settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelConfig {
    /// Merged statistics
    pub input: PathBuf,
    pub output: PathBuf,
    pub min_visits: u64,
    pub bottom_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u32>,
    /// Historical policy to copy labels from instead of ranking
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<PathBuf>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        let settings = LabelSettings::default();
        Self {
            input: PathBuf::from("DATASET/baseline_merged.csv"),
            output: PathBuf::from("DATASET/labels_from_merged.csv"),
            min_visits: settings.min_visits,
            bottom_pct: settings.bottom_pct,
            max_depth: settings.max_depth,
            policy: None,
        }
    }
}

impl LabelConfig {
    pub fn settings(&self) -> LabelSettings {
        LabelSettings { min_visits: self.min_visits, bottom_pct: self.bottom_pct, max_depth: self.max_depth }
    }

    pub fn mode(&self) -> LabelMode {
        match &self.policy {
            Some(path) => LabelMode::Policy(path.clone()),
            None => LabelMode::Ranked,
        }
    }
}

/// Trainer settings
///
/// `features`, `epochs` and `learning_rate` default per strategy when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainConfig {
    pub labels: PathBuf,
    pub output: PathBuf,
    pub strategy: TrainStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureSet>,
    pub keep_depth: u32,
    pub min_visits: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epochs: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learning_rate: Option<f64>,
    pub l2: f64,
    pub batch_size: usize,
    pub seed: u64,
    pub min_examples: usize,
    pub log_every: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            labels: PathBuf::from("DATASET/labels_from_merged.csv"),
            output: PathBuf::from("DATA/bvh_ml_model.json"),
            strategy: TrainStrategy::Batch,
            features: None,
            keep_depth: 4,
            min_visits: 5000,
            epochs: None,
            learning_rate: None,
            l2: 1e-4,
            batch_size: 256,
            seed: 1337,
            min_examples: 50,
            log_every: 100,
        }
    }
}

/// Where compiled decisions come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicySourceKind {
    /// A trained model artifact
    #[default]
    Model,
    /// The fixed ratio rule
    Rule,
}

/// Policy compiler settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileConfig {
    /// Single-run statistics to compile
    pub baseline: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<PathBuf>,
    pub output: PathBuf,
    pub source: PolicySourceKind,
    pub selection: Selection,
    pub keep_depth: u32,
    pub min_visits: u64,
    /// Rule source only
    pub ratio_threshold: f64,
    pub table: TableLayout,
    /// Run to compile when `baseline` holds several
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            baseline: PathBuf::from("DATASET/baseline.csv"),
            model: Some(PathBuf::from("DATA/bvh_ml_model.json")),
            output: PathBuf::from("DATA/bvh_policy_ML.csv"),
            source: PolicySourceKind::Model,
            selection: Selection::default(),
            keep_depth: 4,
            min_visits: 200,
            ratio_threshold: 0.0002,
            table: TableLayout::Sparse,
            run_id: None,
        }
    }
}
