//! Run merger
//!
//! Concatenates per-run baseline files into one dataset tagged with `run_id`.
//! The output header is the first file's header (plus `run_id` when the files
//! do not already carry one). Later files are matched to it by column name, so
//! a reordered header still lands in the right columns.

use super::record::{BASELINE_COLUMNS, RUN_ID};
use crate::io::{self, normalize_header, TableReader};
use podar_common::{PodarError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// One per-run statistics file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFile {
    /// File stem, used when rows carry no run identifier of their own
    pub run_id: String,
    pub path: PathBuf,
}

impl RunFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let run_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { run_id, path }
    }
}

/// Outcome of a merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub output: PathBuf,
    /// Rows contributed by each run file, in merge order
    pub runs: Vec<(String, usize)>,
    pub rows: usize,
}

/// Find run files matching `pattern` inside `dir`, sorted by path.
///
/// `exclude` drops a path from the match set, typically the merge output
/// which often matches the same pattern.
pub fn discover_runs(dir: &Path, pattern: &str, exclude: Option<&Path>) -> Result<Vec<RunFile>> {
    let full = dir.join(pattern);
    let full = full.to_string_lossy();
    let entries = glob::glob(&full).map_err(|e| PodarError::ConfigValue {
        field: "merge.pattern".to_string(),
        message: e.to_string(),
        suggestion: "Use a glob such as baseline_*.csv".to_string(),
    })?;

    let excluded = exclude.map(canonical);
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("skipping unreadable match: {e}");
                None
            }
        })
        .filter(|path| path.is_file())
        .filter(|path| excluded.as_ref() != Some(&canonical(path)))
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(PodarError::NoInputFound {
            dir: dir.to_path_buf(),
            pattern: pattern.to_string(),
        });
    }
    for path in &files {
        log::debug!("found run file {}", path.display());
    }
    Ok(files.into_iter().map(RunFile::new).collect())
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Merge `runs` into one CSV at `output`.
///
/// Every file must provide the baseline columns; other columns of the first
/// file that a later file lacks are written empty. A `run_id` already present
/// in a row wins over the file stem.
pub fn merge_runs(runs: &[RunFile], output: &Path) -> Result<MergeSummary> {
    let Some(first) = runs.first() else {
        return Err(PodarError::NoInputFound {
            dir: output.parent().map(Path::to_path_buf).unwrap_or_default(),
            pattern: String::new(),
        });
    };

    let reader = TableReader::open(&first.path)?;
    reader.require(BASELINE_COLUMNS)?;
    let mut header = reader.header_names();
    let run_col = match header.iter().position(|h| normalize_header(h) == RUN_ID) {
        Some(idx) => idx,
        None => {
            header.push(RUN_ID.to_string());
            header.len() - 1
        }
    };
    drop(reader);

    let mut writer = io::csv_writer(output)?;
    writer
        .write_record(&header)
        .map_err(|e| PodarError::csv(format!("writing {}", output.display()), e))?;

    let mut summary = MergeSummary { output: output.to_path_buf(), ..Default::default() };
    for run in runs {
        let rows = append_run(run, &header, run_col, &mut writer, output)?;
        log::debug!("{}: {} rows", run.path.display(), rows);
        summary.runs.push((run.run_id.clone(), rows));
        summary.rows += rows;
    }

    io::finish_csv(writer)?;
    log::info!(
        "merged {} run(s), {} rows -> {}",
        summary.runs.len(),
        summary.rows,
        output.display()
    );
    Ok(summary)
}

fn append_run(
    run: &RunFile,
    header: &[String],
    run_col: usize,
    writer: &mut csv::Writer<io::AtomicFile>,
    output: &Path,
) -> Result<usize> {
    let reader = TableReader::open(&run.path)?;
    reader.require(BASELINE_COLUMNS)?;
    let mapping: Vec<Option<usize>> = header.iter().map(|name| reader.column_index(name)).collect();
    let missing: Vec<&str> = header
        .iter()
        .zip(&mapping)
        .filter(|(name, idx)| idx.is_none() && normalize_header(name) != RUN_ID)
        .map(|(name, _)| name.as_str())
        .collect();
    if !missing.is_empty() {
        log::warn!("{}: columns {:?} absent, written empty", run.path.display(), missing);
    }

    let (path, records) = reader.into_records();
    let mut cells = vec![String::new(); header.len()];
    let mut rows = 0;
    for record in records {
        let record = record.map_err(|e| PodarError::csv(format!("reading {}", path.display()), e))?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        for (cell, idx) in cells.iter_mut().zip(&mapping) {
            cell.clear();
            if let Some(value) = idx.and_then(|i| record.get(i)) {
                cell.push_str(value.trim());
            }
        }
        if cells[run_col].is_empty() {
            cells[run_col].push_str(&run.run_id);
        }
        writer
            .write_record(&cells)
            .map_err(|e| PodarError::csv(format!("writing {}", output.display()), e))?;
        rows += 1;
    }
    Ok(rows)
}

/// Discover and merge in one step.
pub fn merge_directory(dir: &Path, pattern: &str, output: &Path) -> Result<MergeSummary> {
    let runs = discover_runs(dir, pattern, Some(output))?;
    merge_runs(&runs, output)
}
