//! Pipeline configuration
//!
//! `podar.yaml` is read once, overridden from the command line, validated,
//! and then handed to each stage as an explicit value.

mod cli;
mod schema;
mod validate;

pub use cli::{
    apply_overrides, parse_args, Cli, Command, CompileArgs, InitArgs, InspectArgs, LabelArgs, MergeArgs, OutputFormat,
    RunArgs, TrainArgs, ValidateArgs,
};
pub use schema::{CompileConfig, LabelConfig, MergeConfig, PipelineConfig, PolicySourceKind, TrainConfig};
pub use validate::{validate_config, ValidationError};

use podar_common::{PodarError, Result};
use std::path::{Path, PathBuf};

/// Configuration file looked up in the working directory.
pub const DEFAULT_CONFIG: &str = "podar.yaml";

/// Parse a YAML configuration document.
pub fn parse_config(text: &str, origin: &Path) -> Result<PipelineConfig> {
    serde_yaml::from_str(text).map_err(|e| PodarError::ConfigParsing {
        path: origin.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load the pipeline configuration.
///
/// An explicit path must exist. Without one, `podar.yaml` in the working
/// directory is used if present and the built-in defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let path: PathBuf = match path {
        Some(path) if !path.exists() => {
            return Err(PodarError::ConfigNotFound { path: path.to_path_buf() });
        }
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG);
            if !fallback.exists() {
                log::debug!("no {DEFAULT_CONFIG} found; using built-in defaults");
                return Ok(PipelineConfig::default());
            }
            fallback
        }
    };
    let text = std::fs::read_to_string(&path)
        .map_err(|e| PodarError::io(format!("reading {}", path.display()), e))?;
    log::debug!("loaded configuration from {}", path.display());
    parse_config(&text, &path)
}

/// Load, apply command-line overrides, then validate.
pub fn resolve_config(path: Option<&Path>, command: &Command) -> Result<PipelineConfig> {
    let mut config = load_config(path)?;
    apply_overrides(&mut config, command);
    validate_config(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_explicit_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "labels:\n  bottom_pct: 0.3\n  min_visits: 100").unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.labels.bottom_pct, 0.3);
        assert_eq!(config.labels.min_visits, 100);
        assert_eq!(config.train, TrainConfig::default());
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = load_config(Some(Path::new("/no/such/podar.yaml"))).unwrap_err();
        assert!(matches!(err, PodarError::ConfigNotFound { .. }));
        assert_eq!(err.code(), "E001");
    }

    #[test]
    fn test_bad_yaml_is_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "train: [unclosed").unwrap();
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, PodarError::ConfigParsing { .. }));
    }

    #[test]
    fn test_resolve_rejects_invalid_override() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{}}").unwrap();
        let cli = parse_args(["podar", "train", "--epochs", "0"]).unwrap();
        let err = resolve_config(Some(file.path()), &cli.command).unwrap_err();
        match err {
            PodarError::ConfigValue { field, .. } => assert_eq!(field, "train.epochs"),
            other => panic!("Expected ConfigValue, got {other:?}"),
        }
    }
}
