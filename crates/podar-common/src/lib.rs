//! Shared infrastructure for the podar pipeline.
//!
//! - Error handling with actionable diagnostics and stable codes
//! - CLI log levels and `env_logger` initialisation

pub mod error;
pub mod logging;

pub use error::{PodarError, Result};
pub use logging::{init_logger, say, LogLevel};
