//! Error types with actionable diagnostics.
//!
//! Every fatal condition a pipeline stage can hit is a variant here. Rows that
//! fail numeric parsing are not errors: the table decoder skips and counts them.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for podar operations.
pub type Result<T> = std::result::Result<T, PodarError>;

/// Errors that can halt a podar pipeline stage.
///
/// Each variant carries enough context for the operator to fix the input
/// without reading the source.
#[derive(Error, Debug)]
pub enum PodarError {
    /// Configuration file not found at expected path.
    #[error("Configuration file not found: {path}\n  → Run `podar init` or pass --config to point at an existing file")]
    ConfigNotFound { path: PathBuf },

    /// Configuration file has invalid syntax.
    #[error("Invalid configuration syntax in {path}:\n  {message}\n  → Check YAML syntax at the indicated line")]
    ConfigParsing { path: PathBuf, message: String },

    /// Configuration value is invalid.
    #[error("Invalid configuration value for '{field}': {message}\n  → {suggestion}")]
    ConfigValue { field: String, message: String, suggestion: String },

    /// A required statistics, label, policy or model file is absent.
    #[error("Required input file not found: {path}\n  → Run the upstream stage first or fix the path in the config")]
    MissingInputFile { path: PathBuf },

    /// Run discovery matched nothing.
    #[error("No input files matching '{pattern}' in {dir}\n  → Check merge.input_dir and merge.pattern")]
    NoInputFound { dir: PathBuf, pattern: String },

    /// Required columns are absent from an input table.
    #[error("Schema mismatch in {path}: missing columns {missing:?}\n  → The file must provide at least these columns (extra columns are ignored)")]
    SchemaMismatch { path: PathBuf, missing: Vec<String> },

    /// Too few eligible labeled examples to train.
    #[error("Insufficient training data: {found} eligible examples, need at least {required}\n  → Lower train.keep_depth / train.min_visits or provide more runs")]
    InsufficientData { found: usize, required: usize },

    /// Model artifact is internally inconsistent or unreadable.
    #[error("Invalid model artifact {path}: {message}\n  → Retrain with `podar train` to regenerate the artifact")]
    ModelFormat { path: PathBuf, message: String },

    /// Policy compilation input mixes runs without a selector.
    #[error("Baseline contains {} runs ({})\n  → Select one with compile.run_id or --run", runs.len(), runs.join(", "))]
    AmbiguousRuns { runs: Vec<String> },

    /// IO error with context.
    #[error("IO error: {context}\n  Cause: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV framing error with context.
    #[error("CSV error: {context}\n  Cause: {source}")]
    Csv {
        context: String,
        #[source]
        source: csv::Error,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic error for unexpected conditions.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PodarError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { context: context.into(), source }
    }

    /// Create a CSV error with context.
    pub fn csv(context: impl Into<String>, source: csv::Error) -> Self {
        Self::Csv { context: context.into(), source }
    }

    /// Check if this error is caused by operator input rather than a bug.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Self::Internal { .. })
    }

    /// Get the error code for structured output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigNotFound { .. } => "E001",
            Self::ConfigParsing { .. } => "E002",
            Self::ConfigValue { .. } => "E003",
            Self::MissingInputFile { .. } => "E010",
            Self::NoInputFound { .. } => "E011",
            Self::SchemaMismatch { .. } => "E020",
            Self::InsufficientData { .. } => "E030",
            Self::ModelFormat { .. } => "E040",
            Self::AmbiguousRuns { .. } => "E041",
            Self::Io { .. } => "E050",
            Self::Csv { .. } => "E051",
            Self::Serialization { .. } => "E052",
            Self::Internal { .. } => "E999",
        }
    }
}

impl From<serde_json::Error> for PodarError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization { message: format!("JSON: {err}") }
    }
}

impl From<serde_yaml::Error> for PodarError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization { message: format!("YAML: {err}") }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_variants() -> Vec<PodarError> {
        vec![
            PodarError::ConfigNotFound { path: "".into() },
            PodarError::ConfigParsing { path: "".into(), message: "".into() },
            PodarError::ConfigValue {
                field: "".into(),
                message: "".into(),
                suggestion: "".into(),
            },
            PodarError::MissingInputFile { path: "".into() },
            PodarError::NoInputFound { dir: "".into(), pattern: "".into() },
            PodarError::SchemaMismatch { path: "".into(), missing: vec![] },
            PodarError::InsufficientData { found: 0, required: 50 },
            PodarError::ModelFormat { path: "".into(), message: "".into() },
            PodarError::AmbiguousRuns { runs: vec![] },
            PodarError::io("", std::io::Error::other("x")),
            PodarError::Serialization { message: "".into() },
            PodarError::Internal { message: "".into() },
        ]
    }

    #[test]
    fn test_error_codes_are_unique() {
        let codes: Vec<_> = all_variants().iter().map(PodarError::code).collect();
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn test_all_error_codes_start_with_e() {
        for err in all_variants() {
            assert!(err.code().starts_with('E'));
        }
    }

    #[test]
    fn test_schema_mismatch_lists_missing_columns() {
        let err = PodarError::SchemaMismatch {
            path: "baseline_a.csv".into(),
            missing: vec!["visits".into(), "useful".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("baseline_a.csv"));
        assert!(msg.contains("visits"));
        assert!(msg.contains("useful"));
    }

    #[test]
    fn test_insufficient_data_reports_counts() {
        let msg = PodarError::InsufficientData { found: 12, required: 50 }.to_string();
        assert!(msg.contains("12"));
        assert!(msg.contains("50"));
        assert!(msg.contains("min_visits"));
    }

    #[test]
    fn test_ambiguous_runs_names_runs() {
        let err = PodarError::AmbiguousRuns {
            runs: vec!["baseline_a".into(), "baseline_b".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("2 runs"));
        assert!(msg.contains("baseline_b"));
        assert!(msg.contains("--run"));
    }

    #[test]
    fn test_io_error_constructor() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = PodarError::io("reading labels", io_err);
        assert!(matches!(err, PodarError::Io { .. }));
        assert!(err.to_string().contains("reading labels"));
    }

    #[test]
    fn test_internal_is_not_user_error() {
        assert!(!PodarError::Internal { message: "".into() }.is_user_error());
        assert!(PodarError::MissingInputFile { path: "".into() }.is_user_error());
    }

    #[test]
    fn test_json_error_converts_to_serialization() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: PodarError = json_err.into();
        assert!(matches!(err, PodarError::Serialization { .. }));
        assert_eq!(err.code(), "E052");
    }
}
