//! End-to-end pipeline: merge → label → train → compile.
//!
//! Each stage reads the artifact the previous one published, so a failure
//! leaves every earlier artifact in place and no partial later one.

use crate::compile::{compile_from_config, CompileReport};
use crate::config::PipelineConfig;
use crate::data::{merge_directory, MergeSummary};
use crate::labels::{label_file, LabelSummary};
use crate::train::{train_from_config, TrainSummary};
use podar_common::Result;

/// Result of a complete pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub merge: MergeSummary,
    pub labels: LabelSummary,
    pub train: TrainSummary,
    pub compile: CompileReport,
    /// Total execution time in seconds
    pub duration_seconds: f64,
}

/// All four stages over one configuration.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Execute the stages in order, stopping at the first failure.
    pub fn execute(&self) -> Result<PipelineResult> {
        let start = std::time::Instant::now();
        let config = &self.config;

        log::info!("stage 1/4: merging runs from {}", config.merge.input_dir.display());
        let merge = merge_directory(&config.merge.input_dir, &config.merge.pattern, &config.merge.output)?;

        log::info!("stage 2/4: deriving labels from {}", config.labels.input.display());
        let labels = label_file(
            &config.labels.input,
            &config.labels.output,
            &config.labels.mode(),
            &config.labels.settings(),
        )?;

        log::info!("stage 3/4: training {} model on {}", config.train.strategy, config.train.labels.display());
        let (_, train) = train_from_config(&config.train)?;

        log::info!("stage 4/4: compiling policy from {}", config.compile.baseline.display());
        let compile = compile_from_config(&config.compile)?;

        Ok(PipelineResult { merge, labels, train, compile, duration_seconds: start.elapsed().as_secs_f64() })
    }
}
