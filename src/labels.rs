//! Label derivation
//!
//! Within each run, eligible nodes are ranked by ascending `(ratio, visits)` and
//! the bottom fraction is labeled prunable. Labeling per run keeps runs with
//! very different visit scales from skewing each other. Labels can instead be
//! taken from a historical policy table.

use crate::data::{read_baseline, BaselineRecord, LabelRecord, NodeStats, PolicyEntry, LABEL_COLUMNS};
use crate::io::{self, ReadStats, TableReader};
use podar_common::{PodarError, Result};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Thresholds for ranked labeling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelSettings {
    /// Minimum visits for a node to be ranked
    pub min_visits: u64,
    /// Fraction of each run's eligible nodes labeled prunable
    pub bottom_pct: f64,
    /// Deepest depth considered, if any
    pub max_depth: Option<u32>,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self { min_visits: 2000, bottom_pct: 0.15, max_depth: None }
    }
}

impl LabelSettings {
    pub fn admits(&self, stats: &impl NodeStats) -> bool {
        !stats.is_root()
            && stats.visits() >= self.min_visits
            && self.max_depth.map_or(true, |max| stats.depth() <= max)
    }
}

/// Number of prunable labels for `eligible` ranked nodes: `ceil(pct * n)`, at least 1.
pub fn prune_count(eligible: usize, bottom_pct: f64) -> usize {
    if eligible == 0 {
        return 0;
    }
    // The epsilon keeps 0.3 * 10 from rounding up to 4.
    let k = (bottom_pct * eligible as f64 - 1e-9).ceil();
    (k.max(1.0) as usize).min(eligible)
}

fn rank_order(a: &BaselineRecord, b: &BaselineRecord) -> Ordering {
    a.ratio()
        .total_cmp(&b.ratio())
        .then(a.visits.cmp(&b.visits))
        .then(a.node_id.cmp(&b.node_id))
}

/// Rank-based labels for every eligible record, grouped by run.
///
/// Output is ordered by run id, then by rank. Runs with no eligible node
/// contribute nothing.
pub fn derive_labels(records: &[BaselineRecord], settings: &LabelSettings) -> Vec<LabelRecord> {
    let mut runs: BTreeMap<&str, Vec<&BaselineRecord>> = BTreeMap::new();
    for rec in records.iter().filter(|r| settings.admits(*r)) {
        runs.entry(rec.run_id.as_str()).or_default().push(rec);
    }

    let mut labels = Vec::new();
    for (run_id, mut group) in runs {
        group.sort_by(|a, b| rank_order(a, b));
        let k = prune_count(group.len(), settings.bottom_pct);
        log::debug!("run '{run_id}': {} eligible, {k} labeled prunable", group.len());
        labels.extend(
            group
                .iter()
                .enumerate()
                .map(|(rank, rec)| LabelRecord::from_baseline(rec, rank < k)),
        );
    }
    labels
}

/// Read a `node_id,prune` table. Later rows for the same node win.
pub fn read_policy(path: &Path) -> Result<HashMap<u64, bool>> {
    let mut policy = HashMap::new();
    TableReader::open(path)?.for_each(|row: PolicyEntry| {
        policy.insert(row.node_id, row.prune);
        Ok(())
    })?;
    Ok(policy)
}

/// Labels copied from a policy table; nodes it omits are labeled 0.
///
/// Output is ordered by run id, then node id.
pub fn labels_from_policy(
    records: &[BaselineRecord],
    policy: &HashMap<u64, bool>,
    settings: &LabelSettings,
) -> Vec<LabelRecord> {
    let mut labels: Vec<LabelRecord> = records
        .iter()
        .filter(|r| settings.admits(*r))
        .map(|r| LabelRecord::from_baseline(r, policy.get(&r.node_id).copied().unwrap_or(false)))
        .collect();
    labels.sort_by(|a, b| a.run_id.cmp(&b.run_id).then(a.node_id.cmp(&b.node_id)));
    labels
}

/// Write a label file atomically.
pub fn write_labels(path: &Path, labels: &[LabelRecord]) -> Result<()> {
    let context = || format!("writing {}", path.display());
    let mut writer = io::csv_writer(path)?;
    writer.write_record(LABEL_COLUMNS).map_err(|e| PodarError::csv(context(), e))?;
    for label in labels {
        writer.write_record(label.to_row()).map_err(|e| PodarError::csv(context(), e))?;
    }
    io::finish_csv(writer)?;
    Ok(())
}

/// Read a label file into memory.
pub fn read_labels(path: &Path) -> Result<(Vec<LabelRecord>, ReadStats)> {
    TableReader::open(path)?.read_all()
}

/// Where labels come from.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelMode {
    /// Bottom fraction of each run by usefulness
    Ranked,
    /// Copy decisions from a historical policy file
    Policy(PathBuf),
}

/// Outcome of a labeling stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSummary {
    pub output: PathBuf,
    pub runs: usize,
    pub labels: usize,
    pub positives: usize,
    pub skipped_rows: usize,
}

/// Read `input`, label it, and write `output`.
pub fn label_file(
    input: &Path,
    output: &Path,
    mode: &LabelMode,
    settings: &LabelSettings,
) -> Result<LabelSummary> {
    let (records, stats) = read_baseline(input)?;
    let labels = match mode {
        LabelMode::Ranked => derive_labels(&records, settings),
        LabelMode::Policy(path) => labels_from_policy(&records, &read_policy(path)?, settings),
    };
    write_labels(output, &labels)?;

    let mut runs: Vec<&str> = labels.iter().map(|l| l.run_id.as_str()).collect();
    runs.dedup();
    let summary = LabelSummary {
        output: output.to_path_buf(),
        runs: runs.len(),
        labels: labels.len(),
        positives: labels.iter().filter(|l| l.label_prune).count(),
        skipped_rows: stats.skipped,
    };
    log::info!(
        "wrote {} labels ({} prunable) over {} run(s) -> {}",
        summary.labels,
        summary.positives,
        summary.runs,
        output.display()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn rec(run: &str, node: u64, depth: u32, visits: u64, useful: u64) -> BaselineRecord {
        BaselineRecord::new(run, node, depth, visits, useful)
    }

    #[test]
    fn test_prune_count() {
        assert_eq!(prune_count(0, 0.15), 0);
        assert_eq!(prune_count(1, 0.15), 1);
        assert_eq!(prune_count(10, 0.3), 3);
        assert_eq!(prune_count(10, 0.15), 2);
        assert_eq!(prune_count(7, 1.0), 7);
        assert_eq!(prune_count(100, 0.001), 1);
    }

    #[test]
    fn test_ten_nodes_bottom_three() {
        let records: Vec<_> = (1..=10u64).map(|i| rec("a", i, 5, 5000, i * 50)).collect();
        let labels = derive_labels(&records, &LabelSettings { bottom_pct: 0.3, ..Default::default() });
        let pruned: Vec<u64> = labels.iter().filter(|l| l.label_prune).map(|l| l.node_id).collect();
        assert_eq!(pruned, vec![1, 2, 3]);
        assert_eq!(labels.len(), 10);
    }

    #[test]
    fn test_ties_prefer_fewer_visits() {
        let records = vec![rec("a", 1, 5, 4000, 40), rec("a", 2, 5, 2000, 20), rec("a", 3, 5, 3000, 300)];
        let labels = derive_labels(&records, &LabelSettings { bottom_pct: 0.1, ..Default::default() });
        assert_eq!(labels[0].node_id, 2);
        assert!(labels[0].label_prune);
        assert!(!labels[1].label_prune);
    }

    #[test]
    fn test_eligibility_filters() {
        let records = vec![
            rec("a", 0, 0, 9000, 1),
            rec("a", 1, 2, 1999, 1),
            rec("a", 2, 9, 5000, 1),
            rec("a", 3, 3, 5000, 1),
        ];
        let settings = LabelSettings { max_depth: Some(8), ..Default::default() };
        let labels = derive_labels(&records, &settings);
        assert_eq!(labels.iter().map(|l| l.node_id).collect::<Vec<_>>(), vec![3]);
        assert!(labels[0].label_prune);
    }

    #[test]
    fn test_runs_are_labeled_independently() {
        let mut records = Vec::new();
        for i in 1..=10u64 {
            records.push(rec("big", i, 5, 1_000_000, i * 1000));
            records.push(rec("small", i, 5, 2000, i * 100));
        }
        let labels = derive_labels(&records, &LabelSettings { bottom_pct: 0.2, ..Default::default() });
        for run in ["big", "small"] {
            let positives = labels.iter().filter(|l| l.run_id == run && l.label_prune).count();
            assert_eq!(positives, 2);
        }
        assert_eq!(labels[0].run_id, "big");
    }

    #[test]
    fn test_empty_run_contributes_nothing() {
        let labels = derive_labels(&[rec("a", 1, 5, 10, 1)], &LabelSettings::default());
        assert!(labels.is_empty());
    }

    #[test]
    fn test_policy_join_defaults_to_zero() {
        let records = vec![rec("a", 1, 5, 9000, 1), rec("a", 2, 5, 9000, 1), rec("a", 0, 0, 9000, 9)];
        let policy = HashMap::from([(2, true), (0, true)]);
        let labels = labels_from_policy(&records, &policy, &LabelSettings::default());
        assert_eq!(labels.len(), 2);
        assert!(!labels[0].label_prune);
        assert!(labels[1].label_prune);
    }

    #[test]
    fn test_label_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("merged.csv");
        let output = dir.path().join("labels.csv");
        let mut body = String::from("node_id,depth,visits,useful,run_id\n");
        for i in 1..=10 {
            body.push_str(&format!("{i},5,5000,{},baseline_a\n", i * 50));
        }
        body.push_str("bad,5,5000,1,baseline_a\n");
        std::fs::write(&input, body).unwrap();

        let settings = LabelSettings { bottom_pct: 0.3, ..Default::default() };
        let summary = label_file(&input, &output, &LabelMode::Ranked, &settings).unwrap();
        assert_eq!(summary.labels, 10);
        assert_eq!(summary.positives, 3);
        assert_eq!(summary.skipped_rows, 1);

        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.starts_with("run_id,node_id,label_prune,visits,useful,depth,ratio\n"));
        assert!(text.contains("baseline_a,1,1,5000,50,5,0.0100000000\n"));

        let (labels, _) = read_labels(&output).unwrap();
        assert_eq!(labels.len(), 10);
        assert_eq!(labels.iter().filter(|l| l.label_prune).count(), 3);
    }

    #[test]
    fn test_policy_mode_from_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("merged.csv");
        let policy = dir.path().join("policy.csv");
        let output = dir.path().join("labels.csv");
        std::fs::write(&input, "node_id,depth,visits,useful,run_id\n5,6,3000,1,r\n6,6,3000,2,r\n").unwrap();
        std::fs::write(&policy, "node_id,prune\n0,0\n6,1\n").unwrap();
        let summary =
            label_file(&input, &output, &LabelMode::Policy(policy), &LabelSettings::default()).unwrap();
        assert_eq!(summary.positives, 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_fraction_within_rounding(
            useful in proptest::collection::vec(0u64..5000, 1..200),
            pct in 0.01f64..1.0,
        ) {
            let records: Vec<_> = useful
                .iter()
                .enumerate()
                .map(|(i, &u)| rec("r", i as u64 + 1, 5, 5000, u))
                .collect();
            let settings = LabelSettings { bottom_pct: pct, ..Default::default() };
            let labels = derive_labels(&records, &settings);
            let n = labels.len();
            let k = labels.iter().filter(|l| l.label_prune).count();
            prop_assert_eq!(n, records.len());
            prop_assert!(k >= 1);
            prop_assert!((k as f64) < pct * n as f64 + 1.0);
            prop_assert!((k as f64) >= pct * n as f64 - 1e-6 || k == 1);
        }

        #[test]
        fn prop_labels_ignore_input_order(
            useful in proptest::collection::vec(0u64..100, 2..60),
            seed in any::<u64>(),
        ) {
            use rand::seq::SliceRandom;
            use rand::SeedableRng;
            let records: Vec<_> = useful
                .iter()
                .enumerate()
                .map(|(i, &u)| rec(if i % 2 == 0 { "a" } else { "b" }, i as u64 + 1, 5, 2000 + i as u64, u))
                .collect();
            let mut shuffled = records.clone();
            shuffled.shuffle(&mut rand::rngs::StdRng::seed_from_u64(seed));
            let settings = LabelSettings::default();
            prop_assert_eq!(derive_labels(&records, &settings), derive_labels(&shuffled, &settings));
        }
    }
}
