//! Training diagnostics: confusion counts and log-loss
//!
//! Reported periodically; never used to stop training.

use std::fmt;

/// Probability at which a prediction counts as "prune" for diagnostics.
pub const DECISION_THRESHOLD: f64 = 0.5;

const LOSS_EPS: f64 = 1e-12;

/// Binary confusion counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinaryConfusion {
    pub true_pos: usize,
    pub false_pos: usize,
    pub true_neg: usize,
    pub false_neg: usize,
}

impl BinaryConfusion {
    pub fn record(&mut self, predicted: bool, actual: bool) {
        match (predicted, actual) {
            (true, true) => self.true_pos += 1,
            (true, false) => self.false_pos += 1,
            (false, false) => self.true_neg += 1,
            (false, true) => self.false_neg += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_pos + self.false_pos + self.true_neg + self.false_neg
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_pos + self.true_neg, self.total())
    }

    /// 0 when nothing was predicted positive.
    pub fn precision(&self) -> f64 {
        ratio(self.true_pos, self.true_pos + self.false_pos)
    }

    /// 0 when there are no positives.
    pub fn recall(&self) -> f64 {
        ratio(self.true_pos, self.true_pos + self.false_neg)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Running mean binary cross-entropy.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LogLoss {
    sum: f64,
    count: usize,
}

impl LogLoss {
    pub fn record(&mut self, probability: f64, actual: bool) {
        let p = probability.clamp(LOSS_EPS, 1.0 - LOSS_EPS);
        self.sum -= if actual { p.ln() } else { (1.0 - p).ln() };
        self.count += 1;
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Diagnostics for one reported epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochReport {
    pub epoch: usize,
    pub confusion: BinaryConfusion,
    /// Mean log-loss, when the strategy tracks it
    pub log_loss: Option<f64>,
}

impl fmt::Display for EpochReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "epoch {:>5}  acc={:.3}  prec={:.3}  rec={:.3}",
            self.epoch,
            self.confusion.accuracy(),
            self.confusion.precision(),
            self.confusion.recall()
        )?;
        if let Some(loss) = self.log_loss {
            write!(f, "  logloss={loss:.4}")?;
        }
        Ok(())
    }
}

/// Whether `epoch` (1-based) of `total` is reported at cadence `every`.
pub fn is_report_epoch(epoch: usize, total: usize, every: usize) -> bool {
    epoch == 1 || epoch == total || (every > 0 && epoch % every == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_confusion_rates() {
        let mut c = BinaryConfusion::default();
        c.record(true, true);
        c.record(true, false);
        c.record(false, false);
        c.record(false, true);
        c.record(true, true);
        assert_eq!(c.total(), 5);
        assert_relative_eq!(c.accuracy(), 0.6);
        assert_relative_eq!(c.precision(), 2.0 / 3.0);
        assert_relative_eq!(c.recall(), 2.0 / 3.0);
    }

    #[test]
    fn test_empty_confusion_is_zero() {
        let c = BinaryConfusion::default();
        assert_eq!(c.accuracy(), 0.0);
        assert_eq!(c.precision(), 0.0);
        assert_eq!(c.recall(), 0.0);
    }

    #[test]
    fn test_log_loss_is_finite_at_extremes() {
        let mut loss = LogLoss::default();
        loss.record(0.0, true);
        loss.record(1.0, false);
        assert!(loss.mean().is_finite());
        let mut loss = LogLoss::default();
        loss.record(0.5, true);
        assert_relative_eq!(loss.mean(), std::f64::consts::LN_2);
    }

    #[test]
    fn test_report_cadence() {
        assert!(is_report_epoch(1, 2000, 100));
        assert!(is_report_epoch(100, 2000, 100));
        assert!(!is_report_epoch(150, 2000, 100));
        assert!(is_report_epoch(2000, 2000, 100));
        assert!(is_report_epoch(3, 3, 100));
        assert!(!is_report_epoch(2, 3, 100));
    }

    #[test]
    fn test_report_display() {
        let report = EpochReport { epoch: 3, confusion: BinaryConfusion::default(), log_loss: Some(0.25) };
        let text = report.to_string();
        assert!(text.contains("epoch     3"));
        assert!(text.contains("logloss=0.2500"));
    }
}
