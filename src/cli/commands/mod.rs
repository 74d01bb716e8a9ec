//! CLI command implementations

mod compile;
mod init;
mod inspect;
mod label;
mod merge;
mod run;
mod train;
mod validate;


use crate::config::{Cli, Command};
use podar_common::{LogLevel, Result};

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<()> {
    let level = LogLevel::from_flags(cli.verbose, cli.quiet);
    let config = cli.config.as_deref();

    match &cli.command {
        Command::Merge(_) => merge::run_merge(config, &cli.command, level),
        Command::Label(_) => label::run_label(config, &cli.command, level),
        Command::Train(_) => train::run_train(config, &cli.command, level),
        Command::Compile(_) => compile::run_compile(config, &cli.command, level),
        Command::Run(_) => run::run_pipeline(config, &cli.command, level),
        Command::Validate(args) => validate::run_validate(config, args, level),
        Command::Inspect(args) => inspect::run_inspect(args, level),
        Command::Init(args) => init::run_init(args, level),
    }
}
