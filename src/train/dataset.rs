//! Label sources and in-memory training matrices

use crate::data::LabelRecord;
use crate::features::FeatureExtractor;
use crate::io::{ReadStats, TableReader};
use ndarray::{Array1, Array2};
use podar_common::{PodarError, Result};
use std::path::Path;

/// Where a trainer reads its labeled examples.
#[derive(Debug, Clone, Copy)]
pub enum LabelSource<'a> {
    /// Already in memory
    Records(&'a [LabelRecord]),
    /// A label file, read row by row on every pass
    File(&'a Path),
}

impl LabelSource<'_> {
    /// One pass over every decodable label.
    pub fn for_each<F>(&self, mut visit: F) -> Result<ReadStats>
    where
        F: FnMut(&LabelRecord) -> Result<()>,
    {
        match self {
            Self::Records(records) => {
                for rec in records.iter() {
                    visit(rec)?;
                }
                Ok(ReadStats { rows: records.len(), skipped: 0 })
            }
            Self::File(path) => TableReader::open(path)?.for_each(|rec: LabelRecord| visit(&rec)),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Records(records) => format!("{} in-memory labels", records.len()),
            Self::File(path) => path.display().to_string(),
        }
    }
}

/// Example counts by class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassCounts {
    pub positives: usize,
    pub negatives: usize,
}

impl ClassCounts {
    pub fn record(&mut self, positive: bool) {
        if positive {
            self.positives += 1;
        } else {
            self.negatives += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.positives + self.negatives
    }

    /// `negatives / max(1, positives)`.
    pub fn pos_weight(&self) -> f64 {
        self.negatives as f64 / self.positives.max(1) as f64
    }

    /// Fail unless at least `required` examples exist.
    pub fn ensure(&self, required: usize) -> Result<()> {
        if self.total() < required {
            return Err(PodarError::InsufficientData { found: self.total(), required });
        }
        Ok(())
    }
}

/// Eligible examples held in memory.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub x: Array2<f64>,
    pub y: Array1<f64>,
    pub counts: ClassCounts,
    pub stats: ReadStats,
}

impl Dataset {
    /// Extract every eligible example from `source`.
    pub fn collect(source: &LabelSource<'_>, extractor: &FeatureExtractor) -> Result<Self> {
        let width = extractor.width();
        let mut flat = Vec::new();
        let mut targets = Vec::new();
        let mut counts = ClassCounts::default();

        let stats = source.for_each(|rec| {
            if let Some(x) = extractor.extract(rec) {
                flat.extend_from_slice(&x);
                targets.push(rec.target());
                counts.record(rec.label_prune);
            }
            Ok(())
        })?;

        let rows = targets.len();
        let x = Array2::from_shape_vec((rows, width), flat)
            .map_err(|e| PodarError::Internal { message: format!("feature matrix shape: {e}") })?;
        Ok(Self { x, y: Array1::from(targets), counts, stats })
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

/// Count eligible examples by class without keeping them.
pub fn count_examples(source: &LabelSource<'_>, extractor: &FeatureExtractor) -> Result<(ClassCounts, ReadStats)> {
    let mut counts = ClassCounts::default();
    let stats = source.for_each(|rec| {
        if extractor.eligibility.admits(rec) {
            counts.record(rec.label_prune);
        }
        Ok(())
    })?;
    Ok((counts, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BaselineRecord;
    use crate::features::{Eligibility, FeatureSet};

    fn labels() -> Vec<LabelRecord> {
        vec![
            LabelRecord::from_baseline(&BaselineRecord::new("a", 1, 6, 9000, 3), true),
            LabelRecord::from_baseline(&BaselineRecord::new("a", 2, 6, 9000, 900), false),
            LabelRecord::from_baseline(&BaselineRecord::new("a", 3, 2, 9000, 900), false),
            LabelRecord::from_baseline(&BaselineRecord::new("a", 4, 7, 100, 1), true),
        ]
    }

    #[test]
    fn test_collect_applies_eligibility() {
        let records = labels();
        let ex = FeatureExtractor::new(FeatureSet::LogitRatio, Eligibility::new(4, 5000));
        let data = Dataset::collect(&LabelSource::Records(&records), &ex).unwrap();
        assert_eq!(data.x.shape(), &[2, 5]);
        assert_eq!(data.y.to_vec(), vec![1.0, 0.0]);
        assert_eq!(data.counts, ClassCounts { positives: 1, negatives: 1 });
    }

    #[test]
    fn test_count_matches_collect() {
        let records = labels();
        let ex = FeatureExtractor::new(FeatureSet::UsefulRate, Eligibility::new(4, 50));
        let (counts, stats) = count_examples(&LabelSource::Records(&records), &ex).unwrap();
        let data = Dataset::collect(&LabelSource::Records(&records), &ex).unwrap();
        assert_eq!(counts, data.counts);
        assert_eq!(stats.rows, 4);
    }

    #[test]
    fn test_pos_weight() {
        assert_eq!(ClassCounts { positives: 2, negatives: 8 }.pos_weight(), 4.0);
        assert_eq!(ClassCounts { positives: 0, negatives: 8 }.pos_weight(), 8.0);
    }

    #[test]
    fn test_ensure_minimum() {
        let counts = ClassCounts { positives: 10, negatives: 39 };
        let err = counts.ensure(50).unwrap_err();
        assert!(matches!(err, PodarError::InsufficientData { found: 49, required: 50 }));
        assert!(counts.ensure(49).is_ok());
    }
}
