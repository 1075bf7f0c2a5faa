//! Shared, updatable policy handle.

use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{ConfigError, ExclusionPattern, PolicyConfig};

/// A policy shared between the user (who may change it at any time) and the
/// load interceptor (which reads it on every load event).
///
/// Cloning the handle shares the underlying policy.
#[derive(Clone, Debug, Default)]
pub struct SharedPolicy {
    inner: Arc<RwLock<PolicyConfig>>,
}

impl SharedPolicy {
    pub fn new(policy: PolicyConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(policy)),
        }
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, PolicyConfig> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, PolicyConfig> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `f` against the current policy.
    pub fn read<R>(&self, f: impl FnOnce(&PolicyConfig) -> R) -> R {
        f(&self.read_guard())
    }

    /// Copy of the current policy.
    pub fn snapshot(&self) -> PolicyConfig {
        self.read_guard().clone()
    }

    pub fn replace(&self, policy: PolicyConfig) {
        *self.write_guard() = policy;
    }

    pub fn update(&self, f: impl FnOnce(&mut PolicyConfig)) {
        f(&mut self.write_guard());
    }

    pub fn push_exclusion(&self, pattern: ExclusionPattern) {
        self.write_guard().push(pattern);
    }

    /// Replace the policy with the contents of a JSON policy file.
    ///
    /// On error the current policy is left untouched.
    pub fn reload_from_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let policy = PolicyConfig::from_file(path)?;
        self.replace(policy);
        Ok(())
    }
}

impl From<PolicyConfig> for SharedPolicy {
    fn from(policy: PolicyConfig) -> Self {
        Self::new(policy)
    }
}
