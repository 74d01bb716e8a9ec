//! Policy compilation
//!
//! Scores every node that clears the safety floors, selects nodes to prune,
//! then re-applies the floors so that no model or selection mode can prune the
//! root, a shallow node, or a rarely visited node.

mod policy;
mod selection;

#[cfg(test)]
mod proptests;

pub use policy::{sidecar_path, PolicySidecar, PolicyTable, TableLayout, ROOT};
pub use selection::{top_count, Selected, Selection};

use crate::config::{CompileConfig, PolicySourceKind};
use crate::data::{read_baseline, BaselineRecord, NodeStats};
use crate::features::Eligibility;
use crate::io::{load_model, write_atomic};
use crate::model::PolicyModel;
use podar_common::{PodarError, Result};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// What decides whether a node is prunable.
#[derive(Debug, Clone)]
pub enum PolicySource {
    /// Probabilities from a trained model, filtered by a [`Selection`]
    Model { model: PolicyModel, selection: Selection },
    /// `ratio < ratio_threshold`, no model needed
    Rule { ratio_threshold: f64 },
}

impl PolicySource {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Model { .. } => "model",
            Self::Rule { .. } => "rule",
        }
    }
}

/// Hard overrides: nodes failing these are never pruned.
pub type SafetyFloors = Eligibility;

/// Counts reported for a compilation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompileSummary {
    /// Distinct nodes in the input
    pub nodes: usize,
    /// Nodes that cleared the floors and were scored
    pub scored: usize,
    pub pruned: usize,
    /// Weakest selected score, model source only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutoff: Option<f64>,
}

/// Output of [`PolicyCompiler::compile`].
#[derive(Debug, Clone)]
pub struct CompiledPolicy {
    pub table: PolicyTable,
    pub summary: CompileSummary,
}

/// Compiles node statistics into a policy table.
#[derive(Debug, Clone)]
pub struct PolicyCompiler {
    pub source: PolicySource,
    pub floors: SafetyFloors,
    pub layout: TableLayout,
}

impl PolicyCompiler {
    pub fn new(source: PolicySource, floors: SafetyFloors, layout: TableLayout) -> Self {
        if let PolicySource::Model { model, .. } = &source {
            let trained = &model.metadata().hyperparameters;
            if floors.keep_depth < trained.keep_depth || floors.min_visits < trained.min_visits {
                log::warn!(
                    "compile floors (keep_depth={}, min_visits={}) are looser than training floors \
                     (keep_depth={}, min_visits={}); the model will score nodes unlike any it saw",
                    floors.keep_depth,
                    floors.min_visits,
                    trained.keep_depth,
                    trained.min_visits
                );
            }
        }
        Self { source, floors, layout }
    }

    /// Decide every node of a single run.
    ///
    /// Records repeating a node id are ignored after the first.
    pub fn compile(&self, records: &[BaselineRecord]) -> CompiledPolicy {
        let mut unique: BTreeMap<u64, &BaselineRecord> = BTreeMap::new();
        for rec in records {
            match unique.entry(rec.node_id) {
                Entry::Vacant(slot) => {
                    slot.insert(rec);
                }
                Entry::Occupied(_) => log::warn!("node {} appears more than once; keeping the first row", rec.node_id),
            }
        }

        let eligible: Vec<&BaselineRecord> =
            unique.values().copied().filter(|rec| self.floors.admits(*rec)).collect();

        let (mut chosen, cutoff): (BTreeSet<u64>, Option<f64>) = match &self.source {
            PolicySource::Model { model, selection } => {
                let scored: Vec<(u64, f64)> =
                    eligible.iter().map(|rec| (rec.node_id, model.score(*rec))).collect();
                let selected = selection.select(&scored);
                (selected.nodes, selected.cutoff)
            }
            PolicySource::Rule { ratio_threshold } => (
                eligible
                    .iter()
                    .filter(|rec| rec.ratio() < *ratio_threshold)
                    .map(|rec| rec.node_id)
                    .collect(),
                None,
            ),
        };

        chosen.retain(|id| unique.get(id).is_some_and(|rec| self.floors.admits(*rec)));

        let decisions: BTreeMap<u64, bool> =
            unique.keys().map(|&id| (id, chosen.contains(&id))).collect();
        let table = PolicyTable::from_decisions(&decisions, self.layout);
        let summary = CompileSummary {
            nodes: unique.len(),
            scored: eligible.len(),
            pruned: table.pruned_count(),
            cutoff,
        };
        CompiledPolicy { table, summary }
    }
}

/// Keep the records of one run.
///
/// With no `run_id`, the input must hold exactly one run.
pub fn select_run(records: Vec<BaselineRecord>, run_id: Option<&str>) -> Result<Vec<BaselineRecord>> {
    let runs: BTreeSet<&str> = records.iter().map(|r| r.run_id.as_str()).collect();
    match run_id {
        Some(wanted) => {
            if !runs.contains(wanted) {
                return Err(PodarError::ConfigValue {
                    field: "compile.run_id".to_string(),
                    message: format!("run '{wanted}' is not in the baseline"),
                    suggestion: format!(
                        "Use one of: {}",
                        runs.iter().copied().collect::<Vec<_>>().join(", ")
                    ),
                });
            }
            Ok(records.into_iter().filter(|r| r.run_id == wanted).collect())
        }
        None if runs.len() > 1 => Err(PodarError::AmbiguousRuns {
            runs: runs.into_iter().map(str::to_string).collect(),
        }),
        None => Ok(records),
    }
}

/// Summary of a configured compile stage.
#[derive(Debug, Clone)]
pub struct CompileReport {
    pub output: PathBuf,
    pub sidecar: PathBuf,
    pub summary: CompileSummary,
    pub skipped_rows: usize,
}

/// Build the configured policy source, loading the model if needed.
pub fn policy_source(config: &CompileConfig) -> Result<PolicySource> {
    match config.source {
        PolicySourceKind::Rule => Ok(PolicySource::Rule { ratio_threshold: config.ratio_threshold }),
        PolicySourceKind::Model => {
            let path = config.model.as_ref().ok_or_else(|| PodarError::ConfigValue {
                field: "compile.model".to_string(),
                message: "no model path for a model-based policy".to_string(),
                suggestion: "Set compile.model or use `source: rule`".to_string(),
            })?;
            Ok(PolicySource::Model { model: load_model(path)?, selection: config.selection })
        }
    }
}

/// Compile `config.baseline` into `config.output` plus its sidecar.
pub fn compile_from_config(config: &CompileConfig) -> Result<CompileReport> {
    let source = policy_source(config)?;
    let (records, stats) = read_baseline(&config.baseline)?;
    let records = select_run(records, config.run_id.as_deref())?;

    let floors = SafetyFloors::new(config.keep_depth, config.min_visits);
    let compiler = PolicyCompiler::new(source, floors, config.table);
    let compiled = compiler.compile(&records);

    let sidecar = PolicySidecar {
        layout: config.table,
        absent_nodes: "prune=0".to_string(),
        source: compiler.source.name().to_string(),
        selection: match &compiler.source {
            PolicySource::Model { selection, .. } => Some(*selection),
            PolicySource::Rule { .. } => None,
        },
        keep_depth: config.keep_depth,
        min_visits: config.min_visits,
        run_id: config.run_id.clone(),
        summary: compiled.summary.clone(),
    };

    let output = compiled.table.write(&config.output)?;
    let sidecar_file = sidecar_path(&output);
    let mut text = serde_json::to_string_pretty(&sidecar)?;
    text.push('\n');
    write_atomic(&sidecar_file, text.as_bytes())?;

    let summary = compiled.summary;
    log::info!(
        "policy: {} nodes, {} scored, {} pruned{} -> {}",
        summary.nodes,
        summary.scored,
        summary.pruned,
        summary.cutoff.map(|c| format!(", cutoff {c:.4}")).unwrap_or_default(),
        output.display()
    );
    Ok(CompileReport { output, sidecar: sidecar_file, summary, skipped_rows: stats.skipped })
}
