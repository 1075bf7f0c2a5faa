//! Policy configuration: which loaded files are excluded from compilation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{ConfigError, ExclusionPattern};

/// Read-only installation roots excluded by the reference policy.
pub const SYSTEM_DIRS: &[&str] = &["/usr", "/opt", "/nix/store", "/gnu/store"];

/// Source of the generated-file rule: a `-autoloads`, `-loaddefs` or `-pkg`
/// marker right before the (possibly compound) suffix.
pub const GENERATED_MARKER: &str = r"-(?:autoloads|loaddefs|pkg)(?:\.[^./]+)+$";

static GENERATED_MARKER_RE: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(GENERATED_MARKER));

fn generated_marker_pattern() -> ExclusionPattern {
    match &*GENERATED_MARKER_RE {
        Ok(re) => ExclusionPattern::Regex {
            source: GENERATED_MARKER.to_string(),
            compiled: Ok(re.clone()),
        },
        Err(_) => ExclusionPattern::regex(GENERATED_MARKER),
    }
}

/// Exclusion policy consulted on every load event.
///
/// Inclusion (a recognized source suffix) is not part of this type: the
/// suffix set belongs to the host process and is read fresh by the filter.
#[derive(Clone, Debug)]
pub struct PolicyConfig {
    exclusions: Vec<ExclusionPattern>,
    /// Emit progress notifications at info level (debug otherwise)
    pub verbose: bool,
}

impl PolicyConfig {
    /// An empty policy: nothing is excluded.
    pub fn new() -> Self {
        Self {
            exclusions: Vec::new(),
            verbose: true,
        }
    }

    /// The reference policy: bootstrap file, system directories and
    /// generated files are excluded.
    pub fn reference(bootstrap_file: Option<PathBuf>) -> Self {
        let mut policy = Self::new();
        if let Some(file) = bootstrap_file {
            policy.push(ExclusionPattern::exact(file));
        }
        for dir in SYSTEM_DIRS {
            policy.push(ExclusionPattern::prefix(*dir));
        }
        policy.push(generated_marker_pattern());
        policy
    }

    pub fn with_exclusion(mut self, pattern: ExclusionPattern) -> Self {
        self.push(pattern);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn push(&mut self, pattern: ExclusionPattern) {
        self.exclusions.push(pattern);
    }

    /// Remove every pattern for which `keep` returns false.
    pub fn retain(&mut self, keep: impl FnMut(&ExclusionPattern) -> bool) {
        self.exclusions.retain(keep);
    }

    pub fn exclusions(&self) -> &[ExclusionPattern] {
        &self.exclusions
    }

    /// Patterns that can never match because their source is malformed.
    pub fn invalid_patterns(&self) -> impl Iterator<Item = &ExclusionPattern> {
        self.exclusions.iter().filter(|p| p.is_invalid())
    }

    /// Index of the first pattern excluding `path`, if any.
    pub fn first_exclusion(&self, path: &Path) -> Option<usize> {
        self.exclusions.iter().position(|p| p.matches(path))
    }

    pub fn from_policy_file(file: PolicyFile) -> Self {
        let mut policy = Self::new().with_verbose(file.verbose);
        if let Some(bootstrap) = file.bootstrap_file {
            policy.push(ExclusionPattern::exact(bootstrap));
        }
        match file.system_dirs {
            Some(dirs) => dirs
                .into_iter()
                .for_each(|d| policy.push(ExclusionPattern::prefix(d))),
            None => SYSTEM_DIRS
                .iter()
                .for_each(|d| policy.push(ExclusionPattern::prefix(*d))),
        }
        if file.exclude_generated {
            policy.push(generated_marker_pattern());
        }
        for source in file.exclude {
            policy.push(ExclusionPattern::regex(source));
        }
        policy
    }

    /// Parse a JSON policy document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let file: PolicyFile = serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            path: None,
            message: e.to_string(),
        })?;
        Ok(Self::from_policy_file(file))
    }

    /// Read and parse a JSON policy file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let file: PolicyFile = serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            message: e.to_string(),
        })?;
        Ok(Self::from_policy_file(file))
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::reference(None)
    }
}

/// On-disk policy document.
///
/// ```json
/// {
///   "bootstrap_file": "/home/u/.config/app/init.el",
///   "exclude": ["/vendor/"],
///   "verbose": false
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyFile {
    /// The process's bootstrap/init file
    pub bootstrap_file: Option<PathBuf>,
    /// System directories; `None` means [`SYSTEM_DIRS`]
    pub system_dirs: Option<Vec<PathBuf>>,
    /// Extra regular expressions
    pub exclude: Vec<String>,
    /// Exclude generated autoload/manifest files
    pub exclude_generated: bool,
    pub verbose: bool,
}

impl Default for PolicyFile {
    fn default() -> Self {
        Self {
            bootstrap_file: None,
            system_dirs: None,
            exclude: Vec::new(),
            exclude_generated: true,
            verbose: true,
        }
    }
}
