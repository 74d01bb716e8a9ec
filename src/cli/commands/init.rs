//! Init command implementation

use crate::config::{InitArgs, PipelineConfig};
use crate::io::write_atomic;
use podar_common::{say, LogLevel, PodarError, Result};

const HEADER: &str = "\
# podar pipeline configuration
# Every key is optional; omitted keys take the values shown here.
";

/// Default configuration rendered as YAML.
pub fn default_config_yaml() -> Result<String> {
    let body = serde_yaml::to_string(&PipelineConfig::default())?;
    Ok(format!("{HEADER}{body}"))
}

pub fn run_init(args: &InitArgs, level: LogLevel) -> Result<()> {
    if args.output.exists() && !args.force {
        return Err(PodarError::ConfigValue {
            field: "output".to_string(),
            message: format!("{} already exists", args.output.display()),
            suggestion: "Pass --force to overwrite it".to_string(),
        });
    }
    let written = write_atomic(&args.output, default_config_yaml()?.as_bytes())?;
    say(level, LogLevel::Normal, &format!("Wrote default configuration to {}", written.display()));
    Ok(())
}
