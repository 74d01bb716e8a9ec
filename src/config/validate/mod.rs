//! Configuration validation
//!
//! Rejects out-of-range settings before any stage runs.

mod error;
mod validator;

#[cfg(test)]
mod proptests;

pub use error::ValidationError;
pub use validator::validate_config;
