//! Warmload Config - Policy configuration
//!
//! Data structures deciding which loaded files are excluded from
//! compilation, plus JSON policy files and a shared handle that lets the
//! policy change while interception is active.
//!
//! No logging and no global state: callers decide how to report
//! [`PolicyConfig::invalid_patterns`].

use std::path::PathBuf;
use thiserror::Error;

mod pattern;
mod policy;
mod shared;

pub use pattern::{ExclusionPattern, PatternError, PredicateFn};
pub use policy::{PolicyConfig, PolicyFile, GENERATED_MARKER, SYSTEM_DIRS};
pub use shared::SharedPolicy;

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Policy file could not be read
    #[error("cannot read policy file '{}': {message}", .path.display())]
    Io { path: PathBuf, message: String },

    /// Policy document is not valid
    #[error("invalid policy{}: {message}", in_file(.path))]
    Parse {
        path: Option<PathBuf>,
        message: String,
    },

    /// Exclusion pattern rejected by strict construction
    #[error("invalid exclusion pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

fn in_file(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!(" in '{}'", p.display()),
        None => String::new(),
    }
}
