//! Record types for baseline statistics and derived labels.

use crate::io::{Row, RowError, TableRow};

/// Columns every baseline statistics file must provide.
pub const BASELINE_COLUMNS: &[&str] = &["node_id", "depth", "visits", "useful"];

/// Column naming the run a merged row came from.
pub const RUN_ID: &str = "run_id";

/// Column order of a label file.
pub const LABEL_COLUMNS: &[&str] =
    &["run_id", "node_id", "label_prune", "visits", "useful", "depth", "ratio"];

/// Per-node traversal statistics.
///
/// Implemented by every record that carries the four raw counters, so feature
/// extraction and safety floors work on baseline and label rows alike.
pub trait NodeStats {
    fn node_id(&self) -> u64;
    fn depth(&self) -> u32;
    fn visits(&self) -> u64;
    fn useful(&self) -> u64;

    /// `useful / max(1, visits)`.
    fn ratio(&self) -> f64 {
        usefulness_ratio(self.visits(), self.useful())
    }

    /// The root sentinel.
    fn is_root(&self) -> bool {
        self.node_id() == 0
    }
}

/// Traversal efficiency of a node.
pub fn usefulness_ratio(visits: u64, useful: u64) -> f64 {
    useful as f64 / visits.max(1) as f64
}

/// One observation of a BVH node in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineRecord {
    /// Originating run; empty for a single-run file without a `run_id` column
    pub run_id: String,
    pub node_id: u64,
    pub depth: u32,
    pub visits: u64,
    pub useful: u64,
}

impl BaselineRecord {
    pub fn new(run_id: impl Into<String>, node_id: u64, depth: u32, visits: u64, useful: u64) -> Self {
        Self { run_id: run_id.into(), node_id, depth, visits, useful }
    }
}

impl NodeStats for BaselineRecord {
    fn node_id(&self) -> u64 {
        self.node_id
    }
    fn depth(&self) -> u32 {
        self.depth
    }
    fn visits(&self) -> u64 {
        self.visits
    }
    fn useful(&self) -> u64 {
        self.useful
    }
}

impl TableRow for BaselineRecord {
    const REQUIRED: &'static [&'static str] = BASELINE_COLUMNS;
    const OPTIONAL: &'static [&'static str] = &[RUN_ID];

    fn decode(row: &Row<'_>) -> Result<Self, RowError> {
        Ok(Self {
            run_id: row.get(RUN_ID).unwrap_or_default().to_string(),
            node_id: row.count("node_id")?,
            depth: row.small_count("depth")?,
            visits: row.count("visits")?,
            useful: row.count("useful")?,
        })
    }
}

/// Supervised training example derived from a baseline record.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRecord {
    pub run_id: String,
    pub node_id: u64,
    pub label_prune: bool,
    pub visits: u64,
    pub useful: u64,
    pub depth: u32,
    /// Ratio as written by the label deriver; features recompute it from the counters
    pub ratio: f64,
}

impl LabelRecord {
    /// Label a baseline record.
    pub fn from_baseline(record: &BaselineRecord, label_prune: bool) -> Self {
        Self {
            run_id: record.run_id.clone(),
            node_id: record.node_id,
            label_prune,
            visits: record.visits,
            useful: record.useful,
            depth: record.depth,
            ratio: record.ratio(),
        }
    }

    /// Target value for training.
    pub fn target(&self) -> f64 {
        if self.label_prune {
            1.0
        } else {
            0.0
        }
    }

    /// Cells in [`LABEL_COLUMNS`] order.
    pub fn to_row(&self) -> [String; 7] {
        [
            self.run_id.clone(),
            self.node_id.to_string(),
            u8::from(self.label_prune).to_string(),
            self.visits.to_string(),
            self.useful.to_string(),
            self.depth.to_string(),
            format!("{:.10}", self.ratio),
        ]
    }
}

impl NodeStats for LabelRecord {
    fn node_id(&self) -> u64 {
        self.node_id
    }
    fn depth(&self) -> u32 {
        self.depth
    }
    fn visits(&self) -> u64 {
        self.visits
    }
    fn useful(&self) -> u64 {
        self.useful
    }
}

impl TableRow for LabelRecord {
    const REQUIRED: &'static [&'static str] =
        &["run_id", "node_id", "label_prune", "visits", "useful", "depth"];
    const OPTIONAL: &'static [&'static str] = &["ratio"];

    fn decode(row: &Row<'_>) -> Result<Self, RowError> {
        let run_id = row.text(RUN_ID)?;
        if run_id.is_empty() {
            return Err(RowError {
                line: row.line(),
                column: RUN_ID.to_string(),
                value: String::new(),
                reason: "a run identifier",
            });
        }
        let visits = row.count("visits")?;
        let useful = row.count("useful")?;
        let ratio = match row.get("ratio") {
            Some(raw) if !raw.is_empty() => row.real("ratio")?,
            _ => usefulness_ratio(visits, useful),
        };
        Ok(Self {
            run_id: run_id.to_string(),
            node_id: row.count("node_id")?,
            label_prune: row.flag("label_prune")?,
            visits,
            useful,
            depth: row.small_count("depth")?,
            ratio,
        })
    }
}

/// One row of a policy table: a node and whether to skip it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyEntry {
    pub node_id: u64,
    pub prune: bool,
}

impl TableRow for PolicyEntry {
    const REQUIRED: &'static [&'static str] = &["node_id", "prune"];

    fn decode(row: &Row<'_>) -> Result<Self, RowError> {
        Ok(Self { node_id: row.count("node_id")?, prune: row.flag("prune")? })
    }
}
