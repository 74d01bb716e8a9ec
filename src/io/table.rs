//! Typed CSV row decoding.
//!
//! A [`TableReader`] resolves the columns a row type needs once, from the
//! header, and fails fast with the full list of missing columns. Header names
//! are matched after stripping a UTF-8 BOM and whitespace, case-insensitively.
//! Extra columns are ignored. Rows whose fields fail to parse are skipped,
//! counted in [`ReadStats`], and logged with their line number.

use podar_common::{PodarError, Result};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// A row type decodable from a CSV table.
pub trait TableRow: Sized {
    /// Columns that must be present in the header.
    const REQUIRED: &'static [&'static str];

    /// Columns read when present.
    const OPTIONAL: &'static [&'static str] = &[];

    /// Decode one row.
    fn decode(row: &Row<'_>) -> std::result::Result<Self, RowError>;
}

/// Counters for one pass over a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    /// Rows decoded successfully
    pub rows: usize,
    /// Malformed rows skipped
    pub skipped: usize,
}

/// A row that failed to decode. Never fatal on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    /// 1-based line number in the source file
    pub line: u64,
    /// Column that failed
    pub column: String,
    /// Offending raw value
    pub value: String,
    /// What was expected
    pub reason: &'static str,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: column '{}' has value {:?}, expected {}",
            self.line, self.column, self.value, self.reason
        )
    }
}

/// Normalize a header cell for matching.
pub fn normalize_header(name: &str) -> String {
    name.trim_start_matches('\u{feff}').trim().to_ascii_lowercase()
}

/// Parse a non-negative count, accepting float spellings such as `"5000.0"`.
///
/// Fractional parts are truncated.
pub fn parse_count(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<u64>() {
        return Some(value);
    }
    let value = raw.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value < u64::MAX as f64 {
        Some(value.trunc() as u64)
    } else {
        None
    }
}

/// One record together with its resolved column positions.
pub struct Row<'a> {
    record: &'a csv::StringRecord,
    columns: &'a [(&'static str, Option<usize>)],
    line: u64,
}

impl<'a> Row<'a> {
    /// Line number of this row in the source file.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Raw trimmed value of a column, `None` when the column is absent.
    pub fn get(&self, name: &str) -> Option<&'a str> {
        let (_, idx) = self.columns.iter().find(|(n, _)| *n == name)?;
        idx.and_then(|i| self.record.get(i)).map(str::trim)
    }

    fn error(&self, column: &str, value: &str, reason: &'static str) -> RowError {
        RowError {
            line: self.line,
            column: column.to_string(),
            value: value.to_string(),
            reason,
        }
    }

    /// Raw value of a required column.
    pub fn text(&self, name: &str) -> std::result::Result<&'a str, RowError> {
        self.get(name)
            .ok_or_else(|| self.error(name, "", "a value"))
    }

    /// A non-negative integer count.
    pub fn count(&self, name: &str) -> std::result::Result<u64, RowError> {
        let raw = self.text(name)?;
        parse_count(raw).ok_or_else(|| self.error(name, raw, "a non-negative integer"))
    }

    /// A count that must fit in 32 bits, such as a tree depth.
    pub fn small_count(&self, name: &str) -> std::result::Result<u32, RowError> {
        let raw = self.text(name)?;
        parse_count(raw)
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| self.error(name, raw, "a non-negative 32-bit integer"))
    }

    /// A finite real number.
    pub fn real(&self, name: &str) -> std::result::Result<f64, RowError> {
        let raw = self.text(name)?;
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.error(name, raw, "a finite number"))
    }

    /// A 0/1 flag. Any non-zero number counts as set.
    pub fn flag(&self, name: &str) -> std::result::Result<bool, RowError> {
        let raw = self.text(name)?;
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| v != 0.0)
            .ok_or_else(|| self.error(name, raw, "0 or 1"))
    }
}

/// CSV reader bound to a header.
pub struct TableReader<R: Read> {
    path: PathBuf,
    reader: csv::Reader<R>,
    headers: csv::StringRecord,
}

impl TableReader<File> {
    /// Open a table on disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PodarError::MissingInputFile { path: path.to_path_buf() });
        }
        let file = File::open(path)
            .map_err(|e| PodarError::io(format!("opening {}", path.display()), e))?;
        Self::from_reader(path, file)
    }
}

impl<R: Read> TableReader<R> {
    /// Wrap any reader. `path` labels errors.
    pub fn from_reader(path: impl Into<PathBuf>, source: R) -> Result<Self> {
        let path = path.into();
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
        let headers = reader
            .headers()
            .map_err(|e| PodarError::csv(format!("reading header of {}", path.display()), e))?
            .clone();
        Ok(Self { path, reader, headers })
    }

    /// Path this table was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Header cells with BOM and surrounding whitespace removed, original case kept.
    pub fn header_names(&self) -> Vec<String> {
        self.headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect()
    }

    /// Position of a column by normalized name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = normalize_header(name);
        self.headers.iter().position(|h| normalize_header(h) == wanted)
    }

    /// Fail with every missing column at once.
    pub fn require(&self, columns: &[&str]) -> Result<()> {
        let missing: Vec<String> = columns
            .iter()
            .filter(|c| self.column_index(c).is_none())
            .map(|c| (*c).to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PodarError::SchemaMismatch { path: self.path.clone(), missing })
        }
    }

    fn resolve<T: TableRow>(&self) -> Result<Vec<(&'static str, Option<usize>)>> {
        self.require(T::REQUIRED)?;
        Ok(T::REQUIRED
            .iter()
            .chain(T::OPTIONAL.iter())
            .map(|name| (*name, self.column_index(name)))
            .collect())
    }

    /// Decode every row, handing each good one to `visit`.
    ///
    /// Rows are streamed; nothing is buffered beyond the current record.
    pub fn for_each<T, F>(mut self, mut visit: F) -> Result<ReadStats>
    where
        T: TableRow,
        F: FnMut(T) -> Result<()>,
    {
        let columns = self.resolve::<T>()?;
        let mut stats = ReadStats::default();
        let mut record = csv::StringRecord::new();

        loop {
            let more = self
                .reader
                .read_record(&mut record)
                .map_err(|e| PodarError::csv(format!("reading {}", self.path.display()), e))?;
            if !more {
                break;
            }
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }
            let line = record.position().map_or(0, csv::Position::line);
            let row = Row { record: &record, columns: &columns, line };
            match T::decode(&row) {
                Ok(value) => {
                    stats.rows += 1;
                    visit(value)?;
                }
                Err(err) => {
                    stats.skipped += 1;
                    log::warn!("{}: skipping malformed row, {err}", self.path.display());
                }
            }
        }

        if stats.skipped > 0 {
            log::warn!(
                "{}: skipped {} malformed row(s), kept {}",
                self.path.display(),
                stats.skipped,
                stats.rows
            );
        }
        Ok(stats)
    }

    /// Decode every row into memory.
    pub fn read_all<T: TableRow>(self) -> Result<(Vec<T>, ReadStats)> {
        let mut rows = Vec::new();
        let stats = self.for_each(|row: T| {
            rows.push(row);
            Ok(())
        })?;
        Ok((rows, stats))
    }

    /// Iterate raw records without decoding.
    pub fn into_records(self) -> (PathBuf, csv::StringRecordsIntoIter<R>) {
        (self.path, self.reader.into_records())
    }
}
