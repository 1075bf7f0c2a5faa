//! Exclusion patterns
//!
//! A pattern is a `path -> bool` matcher. Patterns that cannot be evaluated
//! (a regex that failed to compile, a predicate returning `Err`) never match.

use regex::Regex;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::ConfigError;

/// Why a pattern could not decide whether a path matches.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// The regular expression source did not compile.
    #[error("invalid regex '{source_text}': {message}")]
    InvalidRegex { source_text: String, message: String },

    /// A user predicate failed.
    #[error("predicate '{name}' failed: {message}")]
    Predicate { name: String, message: String },
}

/// Signature of user-supplied predicate patterns.
pub type PredicateFn = dyn Fn(&Path) -> Result<bool, PatternError> + Send + Sync;

/// One exclusion rule of a [`PolicyConfig`](crate::PolicyConfig).
#[derive(Clone)]
pub enum ExclusionPattern {
    /// Regular expression tested against the lossy string form of the path.
    /// Unanchored unless the expression anchors itself.
    Regex {
        source: String,
        compiled: Result<Regex, PatternError>,
    },
    /// Path lies under this directory (component-wise).
    Prefix(PathBuf),
    /// Path is exactly this file (component-wise).
    Exact(PathBuf),
    /// Arbitrary predicate.
    Predicate { name: String, matcher: Arc<PredicateFn> },
}

impl ExclusionPattern {
    /// Build a regex pattern. A malformed expression is kept and never matches.
    pub fn regex(source: impl Into<String>) -> Self {
        let source = source.into();
        let compiled = Regex::new(&source).map_err(|e| PatternError::InvalidRegex {
            source_text: source.clone(),
            message: e.to_string(),
        });
        ExclusionPattern::Regex { source, compiled }
    }

    /// Build a regex pattern, rejecting malformed expressions.
    pub fn try_regex(source: impl Into<String>) -> Result<Self, ConfigError> {
        match Self::regex(source) {
            ExclusionPattern::Regex {
                source,
                compiled: Err(e),
            } => Err(ConfigError::InvalidPattern {
                pattern: source,
                message: e.to_string(),
            }),
            pattern => Ok(pattern),
        }
    }

    pub fn prefix(dir: impl Into<PathBuf>) -> Self {
        ExclusionPattern::Prefix(dir.into())
    }

    pub fn exact(file: impl Into<PathBuf>) -> Self {
        ExclusionPattern::Exact(file.into())
    }

    pub fn predicate<F>(name: impl Into<String>, matcher: F) -> Self
    where
        F: Fn(&Path) -> Result<bool, PatternError> + Send + Sync + 'static,
    {
        ExclusionPattern::Predicate {
            name: name.into(),
            matcher: Arc::new(matcher),
        }
    }

    /// Decide whether `path` matches, reporting patterns that cannot decide.
    pub fn evaluate(&self, path: &Path) -> Result<bool, PatternError> {
        match self {
            ExclusionPattern::Regex { compiled, .. } => match compiled {
                Ok(re) => Ok(re.is_match(&path.to_string_lossy())),
                Err(e) => Err(e.clone()),
            },
            ExclusionPattern::Prefix(dir) => Ok(path.starts_with(dir)),
            ExclusionPattern::Exact(file) => Ok(path == file.as_path()),
            ExclusionPattern::Predicate { name, matcher } => {
                // 用户谓词 panic 同样算作无法求值
                panic::catch_unwind(AssertUnwindSafe(|| matcher(path))).unwrap_or_else(|payload| {
                    Err(PatternError::Predicate {
                        name: name.clone(),
                        message: panic_message(payload.as_ref()),
                    })
                })
            }
        }
    }

    /// Fail-open match: an unevaluable pattern does not exclude anything.
    pub fn matches(&self, path: &Path) -> bool {
        self.evaluate(path).unwrap_or(false)
    }

    /// True for a regex whose source did not compile.
    pub fn is_invalid(&self) -> bool {
        matches!(
            self,
            ExclusionPattern::Regex {
                compiled: Err(_),
                ..
            }
        )
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

impl fmt::Display for ExclusionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionPattern::Regex { source, .. } => write!(f, "regex /{source}/"),
            ExclusionPattern::Prefix(dir) => write!(f, "under {}", dir.display()),
            ExclusionPattern::Exact(file) => write!(f, "file {}", file.display()),
            ExclusionPattern::Predicate { name, .. } => write!(f, "predicate {name}"),
        }
    }
}

impl fmt::Debug for ExclusionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionPattern::Regex { source, compiled } => f
                .debug_struct("Regex")
                .field("source", source)
                .field("valid", &compiled.is_ok())
                .finish(),
            ExclusionPattern::Prefix(dir) => f.debug_tuple("Prefix").field(dir).finish(),
            ExclusionPattern::Exact(file) => f.debug_tuple("Exact").field(file).finish(),
            ExclusionPattern::Predicate { name, .. } => {
                f.debug_struct("Predicate").field("name", name).finish()
            }
        }
    }
}
