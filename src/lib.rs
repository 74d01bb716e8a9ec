//! # Podar: BVH pruning-policy learning
//!
//! Turns per-node traversal statistics recorded by a renderer into a
//! node → prune lookup table:
//!
//! - [`data`]: record types and the run merger
//! - [`labels`]: per-run ranked labels, or labels copied from a historical policy
//! - [`features`]: feature sets and eligibility floors
//! - [`train`]: batch and streaming logistic-regression trainers
//! - [`io`]: model artifacts, typed tables and atomic writes
//! - [`compile`]: policy compilation with hard safety floors
//! - [`pipeline`]: all stages end to end
//!
//! ## Example
//!
//! ```no_run
//! use podar::config::PipelineConfig;
//! use podar::pipeline::Pipeline;
//!
//! let result = Pipeline::new(PipelineConfig::default()).execute().unwrap();
//! println!("{} nodes pruned", result.compile.summary.pruned);
//! ```

pub mod cli;
pub mod compile;
pub mod config;
pub mod data;
pub mod features;
pub mod io;
pub mod labels;
pub mod model;
pub mod pipeline;
pub mod train;

pub use podar_common::{PodarError, Result};
