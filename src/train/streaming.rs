//! Single-pass stochastic gradient descent
//!
//! The label source is re-read on every epoch and never held in memory. Raw
//! features are used as-is. The bias is the weight of a constant input of 1
//! and is regularized like every other weight:
//!
//! ```text
//! p  = sigmoid(b + w·x)
//! w -= lr * ((p - y) * x + l2 * w)
//! b -= lr * ((p - y)     + l2 * b)
//! ```

use super::dataset::{count_examples, LabelSource};
use super::metrics::{is_report_epoch, BinaryConfusion, EpochReport, LogLoss, DECISION_THRESHOLD};
use super::{TrainOutcome, TrainSettings, Trainer};
use crate::model::{sigmoid, Hyperparameters, ModelMetadata, PolicyModel, TrainStrategy};
use podar_common::{PodarError, Result};

/// Out-of-core trainer.
#[derive(Debug, Clone)]
pub struct StreamingTrainer {
    settings: TrainSettings,
}

impl StreamingTrainer {
    pub fn new(settings: TrainSettings) -> Self {
        Self { settings }
    }
}

impl Trainer for StreamingTrainer {
    fn strategy(&self) -> TrainStrategy {
        TrainStrategy::Streaming
    }

    fn train(&self, source: &LabelSource<'_>) -> Result<TrainOutcome> {
        let s = &self.settings;
        let extractor = s.extractor();

        let (counts, stats) = count_examples(source, &extractor)?;
        counts.ensure(s.min_examples)?;
        log::info!(
            "streaming training over {} ({} examples, {} positive), {} epoch(s)",
            source.describe(),
            counts.total(),
            counts.positives,
            s.epochs
        );

        let mut w = vec![0.0; extractor.width()];
        let mut b = 0.0;
        let mut reports = Vec::new();

        for epoch in 1..=s.epochs {
            let mut confusion = BinaryConfusion::default();
            let mut loss = LogLoss::default();

            source.for_each(|rec| {
                let Some(x) = extractor.extract(rec) else {
                    return Ok(());
                };
                let z = b + x.iter().zip(&w).map(|(xi, wi)| xi * wi).sum::<f64>();
                let p = sigmoid(z);
                confusion.record(p >= DECISION_THRESHOLD, rec.label_prune);
                loss.record(p, rec.label_prune);

                let g = p - rec.target();
                for (wi, xi) in w.iter_mut().zip(&x) {
                    *wi -= s.learning_rate * (g * xi + s.l2 * *wi);
                }
                b -= s.learning_rate * (g + s.l2 * b);
                Ok(())
            })?;

            if is_report_epoch(epoch, s.epochs, s.log_every) {
                let report = EpochReport { epoch, confusion, log_loss: Some(loss.mean()) };
                log::info!("{report}");
                reports.push(report);
            }
        }

        let hyperparameters = Hyperparameters {
            epochs: s.epochs,
            learning_rate: s.learning_rate,
            l2: s.l2,
            batch_size: None,
            seed: None,
            keep_depth: s.keep_depth,
            min_visits: s.min_visits,
            pos_weight: None,
        };
        let metadata = ModelMetadata::new(s.features, TrainStrategy::Streaming, hyperparameters);
        let model = PolicyModel::new(w, b, None, metadata).map_err(|message| PodarError::Internal {
            message: format!("streaming training diverged: {message}"),
        })?;

        Ok(TrainOutcome { model, reports, counts, stats })
    }
}
