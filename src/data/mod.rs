//! Baseline statistics: record types and the run merger.

mod merge;
mod record;

pub use merge::{discover_runs, merge_directory, merge_runs, MergeSummary, RunFile};
pub use record::{
    usefulness_ratio, BaselineRecord, LabelRecord, NodeStats, PolicyEntry, BASELINE_COLUMNS, LABEL_COLUMNS,
    RUN_ID,
};

use crate::io::{ReadStats, TableReader};
use podar_common::Result;
use std::path::Path;

/// Load a baseline or merged statistics file.
pub fn read_baseline(path: &Path) -> Result<(Vec<BaselineRecord>, ReadStats)> {
    TableReader::open(path)?.read_all()
}
