//! Core CLI types - Cli, Command, and per-stage argument structs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::types::OutputFormat;
use crate::compile::{Selection, TableLayout};
use crate::config::schema::{PipelineConfig, PolicySourceKind};
use crate::model::TrainStrategy;

/// Podar: learns BVH node pruning policies from traversal statistics
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "podar")]
#[command(version)]
#[command(about = "Learn and compile BVH node pruning policies from renderer traversal statistics")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Pipeline configuration (defaults to ./podar.yaml when present)
    #[arg(short, long, global = true, value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Merge per-run statistics files into one tagged dataset
    Merge(MergeArgs),

    /// Derive training labels from merged statistics
    Label(LabelArgs),

    /// Train a pruning model from a label file
    Train(TrainArgs),

    /// Compile a policy table from statistics and a model or rule
    Compile(CompileArgs),

    /// Run merge, label, train and compile in order
    Run(RunArgs),

    /// Validate the configuration without running anything
    Validate(ValidateArgs),

    /// Show a model artifact's features, weights and provenance
    Inspect(InspectArgs),

    /// Write a default configuration file
    Init(InitArgs),
}

/// Arguments for the merge command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct MergeArgs {
    /// Override the directory searched for run files
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Override the run file glob
    #[arg(long)]
    pub pattern: Option<String>,

    /// Override the merged output path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the label command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct LabelArgs {
    /// Override the merged statistics input
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Override the label output path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override the fraction of each run labeled prunable
    #[arg(long)]
    pub bottom_pct: Option<f64>,

    /// Override the minimum visit count for ranking
    #[arg(long)]
    pub min_visits: Option<u64>,

    /// Copy labels from a historical policy file instead of ranking
    #[arg(long)]
    pub policy: Option<PathBuf>,
}

/// Arguments for the train command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct TrainArgs {
    /// Override the label file
    #[arg(long)]
    pub labels: Option<PathBuf>,

    /// Override the model output path (.json, .yaml or .yml)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Training strategy (batch, streaming)
    #[arg(short, long)]
    pub strategy: Option<TrainStrategy>,

    /// Override number of epochs
    #[arg(short, long)]
    pub epochs: Option<usize>,

    /// Override learning rate
    #[arg(short, long)]
    pub lr: Option<f64>,

    /// Shuffle seed for batch training
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for the compile command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct CompileArgs {
    /// Override the statistics file to compile
    #[arg(short, long)]
    pub baseline: Option<PathBuf>,

    /// Override the model artifact
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Override the policy output path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Use the fixed ratio rule instead of a model
    #[arg(long)]
    pub rule: bool,

    /// Prune nodes scoring at least this probability
    #[arg(short, long, conflicts_with = "top_fraction")]
    pub threshold: Option<f64>,

    /// Prune this fraction of the highest-scoring nodes
    #[arg(long)]
    pub top_fraction: Option<f64>,

    /// Run to compile when the statistics hold several
    #[arg(short, long)]
    pub run: Option<String>,

    /// List every node, not only pruned ones
    #[arg(long)]
    pub full: bool,
}

/// Arguments for the run command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct RunArgs {
    /// Training strategy (batch, streaming)
    #[arg(short, long)]
    pub strategy: Option<TrainStrategy>,

    /// Override number of epochs
    #[arg(short, long)]
    pub epochs: Option<usize>,

    /// Override learning rate
    #[arg(short, long)]
    pub lr: Option<f64>,

    /// Prune nodes scoring at least this probability
    #[arg(short, long, conflicts_with = "top_fraction")]
    pub threshold: Option<f64>,

    /// Prune this fraction of the highest-scoring nodes
    #[arg(long)]
    pub top_fraction: Option<f64>,

    /// Run to compile when the statistics hold several
    #[arg(short, long)]
    pub run: Option<String>,
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Show the resolved configuration
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for the inspect command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct InspectArgs {
    /// Model artifact to inspect
    #[arg(value_name = "MODEL")]
    pub model: PathBuf,

    /// Output format (text, json, yaml)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the init command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct InitArgs {
    /// Where to write the configuration
    #[arg(short, long, default_value = "podar.yaml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

fn apply_selection(config: &mut PipelineConfig, threshold: Option<f64>, top_fraction: Option<f64>) {
    if let Some(probability) = threshold {
        config.compile.selection = Selection::Threshold { probability };
    }
    if let Some(fraction) = top_fraction {
        config.compile.selection = Selection::TopFraction { fraction };
    }
}

/// Apply command-line overrides to a loaded configuration
pub fn apply_overrides(config: &mut PipelineConfig, command: &Command) {
    match command {
        Command::Merge(args) => {
            if let Some(dir) = &args.input_dir {
                config.merge.input_dir = dir.clone();
            }
            if let Some(pattern) = &args.pattern {
                config.merge.pattern = pattern.clone();
            }
            if let Some(output) = &args.output {
                config.merge.output = output.clone();
            }
        }
        Command::Label(args) => {
            if let Some(input) = &args.input {
                config.labels.input = input.clone();
            }
            if let Some(output) = &args.output {
                config.labels.output = output.clone();
            }
            if let Some(pct) = args.bottom_pct {
                config.labels.bottom_pct = pct;
            }
            if let Some(min_visits) = args.min_visits {
                config.labels.min_visits = min_visits;
            }
            if let Some(policy) = &args.policy {
                config.labels.policy = Some(policy.clone());
            }
        }
        Command::Train(args) => {
            if let Some(labels) = &args.labels {
                config.train.labels = labels.clone();
            }
            if let Some(output) = &args.output {
                config.train.output = output.clone();
            }
            if let Some(strategy) = args.strategy {
                config.train.strategy = strategy;
            }
            if let Some(epochs) = args.epochs {
                config.train.epochs = Some(epochs);
            }
            if let Some(lr) = args.lr {
                config.train.learning_rate = Some(lr);
            }
            if let Some(seed) = args.seed {
                config.train.seed = seed;
            }
        }
        Command::Compile(args) => {
            if let Some(baseline) = &args.baseline {
                config.compile.baseline = baseline.clone();
            }
            if let Some(model) = &args.model {
                config.compile.model = Some(model.clone());
            }
            if let Some(output) = &args.output {
                config.compile.output = output.clone();
            }
            if args.rule {
                config.compile.source = PolicySourceKind::Rule;
            }
            if args.full {
                config.compile.table = TableLayout::Full;
            }
            if let Some(run) = &args.run {
                config.compile.run_id = Some(run.clone());
            }
            apply_selection(config, args.threshold, args.top_fraction);
        }
        Command::Run(args) => {
            if let Some(strategy) = args.strategy {
                config.train.strategy = strategy;
            }
            if let Some(epochs) = args.epochs {
                config.train.epochs = Some(epochs);
            }
            if let Some(lr) = args.lr {
                config.train.learning_rate = Some(lr);
            }
            if let Some(run) = &args.run {
                config.compile.run_id = Some(run.clone());
            }
            apply_selection(config, args.threshold, args.top_fraction);
        }
        Command::Validate(_) | Command::Inspect(_) | Command::Init(_) => {}
    }
}
