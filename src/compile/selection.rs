//! Turning scores into prune decisions

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// How scored nodes are chosen for pruning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Selection {
    /// Prune every node whose probability is at least `probability`
    Threshold { probability: f64 },
    /// Prune the highest-scoring `fraction` of scored nodes (at least one)
    TopFraction { fraction: f64 },
}

impl Default for Selection {
    fn default() -> Self {
        Self::Threshold { probability: 0.70 }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Threshold { probability } => write!(f, "threshold p >= {probability}"),
            Self::TopFraction { fraction } => write!(f, "top {:.1}%", fraction * 100.0),
        }
    }
}

/// Nodes chosen by a selection, with the lowest chosen score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selected {
    pub nodes: BTreeSet<u64>,
    /// Score of the weakest selected node, if any was selected
    pub cutoff: Option<f64>,
}

/// `floor(n * fraction)`, at least 1 when `n > 0`.
pub fn top_count(n: usize, fraction: f64) -> usize {
    if n == 0 {
        return 0;
    }
    ((n as f64 * fraction).floor() as usize).clamp(1, n)
}

impl Selection {
    /// Apply to `(node_id, score)` pairs.
    ///
    /// Top-fraction ranks by score descending, breaking ties by ascending
    /// node id.
    pub fn select(&self, scored: &[(u64, f64)]) -> Selected {
        let chosen: Vec<(u64, f64)> = match *self {
            Self::Threshold { probability } => {
                scored.iter().copied().filter(|(_, p)| *p >= probability).collect()
            }
            Self::TopFraction { fraction } => {
                let mut ranked = scored.to_vec();
                ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
                ranked.truncate(top_count(ranked.len(), fraction));
                ranked
            }
        };
        Selected {
            cutoff: chosen.iter().map(|(_, s)| *s).min_by(f64::total_cmp),
            nodes: chosen.into_iter().map(|(id, _)| id).collect(),
        }
    }
}
