//! Normalized mini-batch gradient descent
//!
//! Features are z-scored, rows are shuffled each epoch with a seeded RNG, and
//! every mini-batch takes one step on the class-weighted cross-entropy:
//!
//! ```text
//! g   = (sigmoid(Xw + b) - y) * weight(y)      weight(1) = neg / max(1, pos)
//! w  -= lr * (Xᵀg / |batch| + l2 * w)
//! b  -= lr * mean(g)
//! ```

use super::dataset::{Dataset, LabelSource};
use super::metrics::{is_report_epoch, BinaryConfusion, EpochReport, DECISION_THRESHOLD};
use super::{TrainOutcome, TrainSettings, Trainer};
use crate::model::{sigmoid, Hyperparameters, ModelMetadata, Normalizer, PolicyModel, TrainStrategy};
use ndarray::{Array1, Array2, Axis};
use podar_common::{PodarError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// In-memory trainer with per-feature normalization.
#[derive(Debug, Clone)]
pub struct BatchTrainer {
    settings: TrainSettings,
}

impl BatchTrainer {
    pub fn new(settings: TrainSettings) -> Self {
        Self { settings }
    }
}

fn evaluate(x: &Array2<f64>, y: &Array1<f64>, w: &Array1<f64>, b: f64) -> BinaryConfusion {
    let mut confusion = BinaryConfusion::default();
    for (z, t) in (x.dot(w) + b).iter().zip(y) {
        confusion.record(sigmoid(*z) >= DECISION_THRESHOLD, *t > 0.5);
    }
    confusion
}

impl Trainer for BatchTrainer {
    fn strategy(&self) -> TrainStrategy {
        TrainStrategy::Batch
    }

    fn train(&self, source: &LabelSource<'_>) -> Result<TrainOutcome> {
        let s = &self.settings;
        let extractor = s.extractor();
        let data = Dataset::collect(source, &extractor)?;
        data.counts.ensure(s.min_examples)?;

        let normalizer = Normalizer::fit(&data.x);
        let x = normalizer.transform(&data.x);
        let y = &data.y;
        let pos_weight = data.counts.pos_weight();
        let sample_weight = y.mapv(|t| if t > 0.5 { pos_weight } else { 1.0 });
        log::info!(
            "batch training on {} examples ({} positive, pos_weight={pos_weight:.3}), {} features",
            data.len(),
            data.counts.positives,
            extractor.width()
        );

        let mut w = Array1::<f64>::zeros(extractor.width());
        let mut b = 0.0;
        let mut rng = StdRng::seed_from_u64(s.seed);
        let mut order: Vec<usize> = (0..data.len()).collect();
        let batch_size = s.batch_size.max(1);
        let mut reports = Vec::new();

        for epoch in 1..=s.epochs {
            order.shuffle(&mut rng);
            for chunk in order.chunks(batch_size) {
                let xb = x.select(Axis(0), chunk);
                let yb = y.select(Axis(0), chunk);
                let sw = sample_weight.select(Axis(0), chunk);
                let p = (xb.dot(&w) + b).mapv(sigmoid);
                let g = (p - &yb) * &sw;
                let n = chunk.len() as f64;
                let gw = xb.t().dot(&g) / n + &w * s.l2;
                let gb = g.sum() / n;
                w.scaled_add(-s.learning_rate, &gw);
                b -= s.learning_rate * gb;
            }

            if is_report_epoch(epoch, s.epochs, s.log_every) {
                let report = EpochReport { epoch, confusion: evaluate(&x, y, &w, b), log_loss: None };
                log::info!("{report}");
                reports.push(report);
            }
        }

        let hyperparameters = Hyperparameters {
            epochs: s.epochs,
            learning_rate: s.learning_rate,
            l2: s.l2,
            batch_size: Some(batch_size),
            seed: Some(s.seed),
            keep_depth: s.keep_depth,
            min_visits: s.min_visits,
            pos_weight: Some(pos_weight),
        };
        let metadata = ModelMetadata::new(s.features, TrainStrategy::Batch, hyperparameters);
        let model = PolicyModel::new(w.to_vec(), b, Some(normalizer), metadata)
            .map_err(|message| PodarError::Internal { message: format!("batch training diverged: {message}") })?;

        Ok(TrainOutcome { model, reports, counts: data.counts, stats: data.stats })
    }
}
