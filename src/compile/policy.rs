//! Policy decision tables
//!
//! A table always starts with the root row `0,0`, lists every node at most
//! once, and is sorted by node id. In the sparse layout only pruned nodes
//! follow the root and an absent node means `prune=0`.

use crate::data::PolicyEntry;
use crate::io::{self, TableReader};
use podar_common::{PodarError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Root node id.
pub const ROOT: u64 = 0;

/// Which nodes a policy file lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableLayout {
    /// Root plus pruned nodes
    #[default]
    Sparse,
    /// Every known node
    Full,
}

/// A compiled node → prune table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyTable {
    layout: TableLayout,
    entries: Vec<PolicyEntry>,
}

impl PolicyTable {
    /// Build from per-node decisions. The root is forced to `prune=0`.
    pub fn from_decisions(decisions: &BTreeMap<u64, bool>, layout: TableLayout) -> Self {
        let mut entries = vec![PolicyEntry { node_id: ROOT, prune: false }];
        entries.extend(
            decisions
                .iter()
                .filter(|(id, prune)| **id != ROOT && (layout == TableLayout::Full || **prune))
                .map(|(&node_id, &prune)| PolicyEntry { node_id, prune }),
        );
        Self { layout, entries }
    }

    pub fn layout(&self) -> TableLayout {
        self.layout
    }

    pub fn entries(&self) -> &[PolicyEntry] {
        &self.entries
    }

    pub fn pruned_count(&self) -> usize {
        self.entries.iter().filter(|e| e.prune).count()
    }

    /// Decision for a node; nodes not listed are kept.
    pub fn is_pruned(&self, node_id: u64) -> bool {
        self.entries
            .binary_search_by_key(&node_id, |e| e.node_id)
            .map(|i| self.entries[i].prune)
            .unwrap_or(false)
    }

    /// Write `node_id,prune` rows atomically.
    pub fn write(&self, path: &Path) -> Result<PathBuf> {
        let context = || format!("writing {}", path.display());
        let mut writer = io::csv_writer(path)?;
        writer.write_record(["node_id", "prune"]).map_err(|e| PodarError::csv(context(), e))?;
        for entry in &self.entries {
            writer
                .write_record([entry.node_id.to_string(), u8::from(entry.prune).to_string()])
                .map_err(|e| PodarError::csv(context(), e))?;
        }
        io::finish_csv(writer)
    }

    /// Read a policy file. Duplicate nodes keep their first row.
    pub fn read(path: &Path) -> Result<Self> {
        let mut decisions = BTreeMap::new();
        let mut all_listed_pruned = true;
        TableReader::open(path)?.for_each(|entry: PolicyEntry| {
            if entry.node_id != ROOT && !entry.prune {
                all_listed_pruned = false;
            }
            decisions.entry(entry.node_id).or_insert(entry.prune);
            Ok(())
        })?;
        let layout = if all_listed_pruned { TableLayout::Sparse } else { TableLayout::Full };
        Ok(Self::from_decisions(&decisions, layout))
    }
}

/// Sidecar describing how to interpret a policy file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySidecar {
    pub layout: TableLayout,
    /// Decision for nodes the table does not list
    pub absent_nodes: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<super::Selection>,
    pub keep_depth: u32,
    pub min_visits: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    pub summary: super::CompileSummary,
}

/// Path of the sidecar for a policy file: `<policy>.meta.json`.
pub fn sidecar_path(policy: &Path) -> PathBuf {
    let mut name = policy.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".meta.json");
    policy.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn decisions() -> BTreeMap<u64, bool> {
        BTreeMap::from([(0, true), (3, false), (5, true), (9, true), (12, false)])
    }

    #[test]
    fn test_sparse_table() {
        let table = PolicyTable::from_decisions(&decisions(), TableLayout::Sparse);
        let ids: Vec<u64> = table.entries().iter().map(|e| e.node_id).collect();
        assert_eq!(ids, vec![0, 5, 9]);
        assert!(!table.entries()[0].prune);
        assert!(table.is_pruned(9));
        assert!(!table.is_pruned(3));
        assert!(!table.is_pruned(0));
    }

    #[test]
    fn test_full_table_lists_every_node() {
        let table = PolicyTable::from_decisions(&decisions(), TableLayout::Full);
        assert_eq!(table.entries().len(), 5);
        assert_eq!(table.pruned_count(), 2);
    }

    #[test]
    fn test_write_and_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("policy.csv");
        let table = PolicyTable::from_decisions(&decisions(), TableLayout::Sparse);
        table.write(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "node_id,prune\n0,0\n5,1\n9,1\n");
        assert_eq!(PolicyTable::read(&path).unwrap(), table);
    }

    #[test]
    fn test_read_full_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("policy.csv");
        let table = PolicyTable::from_decisions(&decisions(), TableLayout::Full);
        table.write(&path).unwrap();
        assert_eq!(PolicyTable::read(&path).unwrap().layout(), TableLayout::Full);
    }

    #[test]
    fn test_sidecar_path() {
        assert_eq!(
            sidecar_path(Path::new("DATA/bvh_policy_ML.csv")),
            PathBuf::from("DATA/bvh_policy_ML.csv.meta.json")
        );
    }
}
