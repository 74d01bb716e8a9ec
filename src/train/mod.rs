//! Policy model training
//!
//! Two interchangeable strategies implement [`Trainer`]:
//!
//! - [`BatchTrainer`]: z-scored features, shuffled mini-batches, class-weighted loss
//! - [`StreamingTrainer`]: raw features, per-record SGD, bounded memory
//!
//! Both apply the same eligibility floors and record their feature set in the
//! resulting model. Neither uses early stopping or a holdout split; the
//! periodic reports are diagnostic only.

mod batch;
mod dataset;
mod metrics;
mod streaming;

pub use batch::BatchTrainer;
pub use dataset::{count_examples, ClassCounts, Dataset, LabelSource};
pub use metrics::{is_report_epoch, BinaryConfusion, EpochReport, LogLoss, DECISION_THRESHOLD};
pub use streaming::StreamingTrainer;

use crate::config::TrainConfig;
use crate::features::{Eligibility, FeatureExtractor, FeatureSet};
use crate::io::{save_model, ReadStats};
use crate::model::{PolicyModel, Provenance, TrainStrategy};
use chrono::Utc;
use podar_common::{PodarError, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Resolved training hyperparameters.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainSettings {
    pub features: FeatureSet,
    pub keep_depth: u32,
    pub min_visits: u64,
    pub epochs: usize,
    pub learning_rate: f64,
    pub l2: f64,
    /// Mini-batch size (batch strategy only)
    pub batch_size: usize,
    /// Shuffle seed (batch strategy only)
    pub seed: u64,
    pub min_examples: usize,
    pub log_every: usize,
}

impl TrainSettings {
    /// Defaults for a strategy.
    pub fn for_strategy(strategy: TrainStrategy) -> Self {
        Self {
            features: strategy.default_features(),
            keep_depth: 4,
            min_visits: 5000,
            epochs: strategy.default_epochs(),
            learning_rate: strategy.default_learning_rate(),
            l2: 1e-4,
            batch_size: 256,
            seed: 1337,
            min_examples: 50,
            log_every: 100,
        }
    }

    pub fn extractor(&self) -> FeatureExtractor {
        FeatureExtractor::new(self.features, Eligibility::new(self.keep_depth, self.min_visits))
    }
}

impl From<&TrainConfig> for TrainSettings {
    fn from(config: &TrainConfig) -> Self {
        let strategy = config.strategy;
        Self {
            features: config.features.unwrap_or_else(|| strategy.default_features()),
            keep_depth: config.keep_depth,
            min_visits: config.min_visits,
            epochs: config.epochs.unwrap_or_else(|| strategy.default_epochs()),
            learning_rate: config.learning_rate.unwrap_or_else(|| strategy.default_learning_rate()),
            l2: config.l2,
            batch_size: config.batch_size,
            seed: config.seed,
            min_examples: config.min_examples,
            log_every: config.log_every,
        }
    }
}

/// Result of a training run.
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub model: PolicyModel,
    pub reports: Vec<EpochReport>,
    pub counts: ClassCounts,
    /// Rows read (per pass) and malformed rows skipped
    pub stats: ReadStats,
}

/// A training strategy.
pub trait Trainer {
    fn strategy(&self) -> TrainStrategy;

    /// Fit a model on the eligible examples of `source`.
    ///
    /// Fails with `InsufficientData` below the configured minimum.
    fn train(&self, source: &LabelSource<'_>) -> Result<TrainOutcome>;
}

/// Trainer implementing `strategy`.
pub fn trainer_for(strategy: TrainStrategy, settings: TrainSettings) -> Box<dyn Trainer> {
    match strategy {
        TrainStrategy::Batch => Box::new(BatchTrainer::new(settings)),
        TrainStrategy::Streaming => Box::new(StreamingTrainer::new(settings)),
    }
}

/// Hex SHA-256 of a file.
pub fn sha256_file(path: &Path) -> Result<String> {
    let context = || format!("hashing {}", path.display());
    let mut file = File::open(path).map_err(|e| PodarError::io(context(), e))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).map_err(|e| PodarError::io(context(), e))?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Summary of a configured training stage.
#[derive(Debug, Clone)]
pub struct TrainSummary {
    pub output: PathBuf,
    pub strategy: TrainStrategy,
    pub examples: usize,
    pub positives: usize,
    pub skipped_rows: usize,
    pub final_report: Option<EpochReport>,
}

/// Train on `config.labels`, stamp provenance, and save to `config.output`.
pub fn train_from_config(config: &TrainConfig) -> Result<(PolicyModel, TrainSummary)> {
    let labels = config.labels.as_path();
    if !labels.exists() {
        return Err(PodarError::MissingInputFile { path: labels.to_path_buf() });
    }
    let settings = TrainSettings::from(config);
    let trainer = trainer_for(config.strategy, settings);
    log::debug!("training with strategy {}", trainer.strategy());

    let outcome = trainer.train(&LabelSource::File(labels))?;
    let provenance = Provenance {
        labels_path: labels.display().to_string(),
        labels_sha256: sha256_file(labels)?,
        trained_at: Utc::now(),
        examples: outcome.counts.total(),
        positives: outcome.counts.positives,
        negatives: outcome.counts.negatives,
        crate_version: env!("CARGO_PKG_VERSION").to_string(),
    };
    let mut model = outcome.model;
    model.metadata_mut().provenance = Some(provenance);
    save_model(&model, &config.output)?;

    let summary = TrainSummary {
        output: config.output.clone(),
        strategy: config.strategy,
        examples: outcome.counts.total(),
        positives: outcome.counts.positives,
        skipped_rows: outcome.stats.skipped,
        final_report: outcome.reports.last().copied(),
    };
    Ok((model, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_settings_follow_strategy_defaults() {
        let batch = TrainSettings::for_strategy(TrainStrategy::Batch);
        assert_eq!(batch.features, FeatureSet::LogitRatio);
        assert_eq!(batch.epochs, 2000);
        let streaming = TrainSettings::for_strategy(TrainStrategy::Streaming);
        assert_eq!(streaming.features, FeatureSet::UsefulRate);
        assert_eq!(streaming.epochs, 3);
    }

    #[test]
    fn test_settings_from_config_overrides() {
        let config = TrainConfig {
            strategy: TrainStrategy::Streaming,
            epochs: Some(7),
            features: Some(FeatureSet::LogitRatio),
            ..TrainConfig::default()
        };
        let s = TrainSettings::from(&config);
        assert_eq!(s.epochs, 7);
        assert_eq!(s.features, FeatureSet::LogitRatio);
        assert!((s.learning_rate - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_trainer_for_strategy() {
        let s = TrainSettings::for_strategy(TrainStrategy::Batch);
        assert_eq!(trainer_for(TrainStrategy::Streaming, s.clone()).strategy(), TrainStrategy::Streaming);
        assert_eq!(trainer_for(TrainStrategy::Batch, s).strategy(), TrainStrategy::Batch);
    }

    #[test]
    fn test_sha256_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"abc").unwrap();
        file.flush().unwrap();
        assert_eq!(
            sha256_file(file.path()).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_missing_labels_file() {
        let config = TrainConfig { labels: "/no/such/labels.csv".into(), ..TrainConfig::default() };
        let err = train_from_config(&config).unwrap_err();
        assert!(matches!(err, PodarError::MissingInputFile { .. }));
    }
}
