//! Per-feature z-score normalization

use ndarray::{Array1, Array2, Axis};

/// Smallest standard deviation used as a divisor.
pub const SD_FLOOR: f64 = 1e-12;

/// Column means and standard deviations fitted on a training matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalizer {
    mu: Vec<f64>,
    sd: Vec<f64>,
}

impl Normalizer {
    /// Fit on the rows of `x`. Near-zero deviations are replaced by 1.
    pub fn fit(x: &Array2<f64>) -> Self {
        let cols = x.ncols();
        if x.nrows() == 0 {
            return Self { mu: vec![0.0; cols], sd: vec![1.0; cols] };
        }
        let mu = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(cols));
        let sd = x.std_axis(Axis(0), 0.0);
        Self { mu: mu.to_vec(), sd: sd.iter().map(|&s| floor_sd(s)).collect() }
    }

    /// Rebuild from stored statistics, flooring `sd`.
    pub fn from_parts(mu: Vec<f64>, sd: Vec<f64>) -> Self {
        let sd = sd.into_iter().map(floor_sd).collect();
        Self { mu, sd }
    }

    pub fn mu(&self) -> &[f64] {
        &self.mu
    }

    pub fn sd(&self) -> &[f64] {
        &self.sd
    }

    pub fn len(&self) -> usize {
        self.mu.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mu.is_empty()
    }

    /// Normalize one vector in place.
    pub fn apply(&self, x: &mut [f64]) {
        for ((v, m), s) in x.iter_mut().zip(&self.mu).zip(&self.sd) {
            *v = (*v - m) / s;
        }
    }

    /// Normalized copy of a matrix.
    pub fn transform(&self, x: &Array2<f64>) -> Array2<f64> {
        let mu = Array1::from(self.mu.clone());
        let sd = Array1::from(self.sd.clone());
        (x - &mu) / &sd
    }
}

fn floor_sd(sd: f64) -> f64 {
    if sd.is_finite() && sd >= SD_FLOOR {
        sd
    } else {
        1.0
    }
}
