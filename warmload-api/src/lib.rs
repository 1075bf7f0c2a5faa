//! Warmload API - Load interception facade
//!
//! Provides the control surface of the load interceptor:
//! - `enable()` / `disable()` (both idempotent)
//! - Policy management through a shared handle (WarmloadConfig)
//! - Unified error handling (WarmloadError)
//!
//! For hosts that configure once at startup, this crate provides a global
//! singleton config. For library use, prefer passing `WarmloadConfig` explicitly.

use std::path::Path;
use std::sync::Arc;

use warmload_core::{CompileEngine, EngineStats, LoadInterceptor, Outcome, SweepReport};
use warmload_log::{info, warn};

// Re-export config
pub mod config;
pub use config::{config as get_config, init as init_config, is_initialized, WarmloadConfig};

// Re-export error and types
pub mod error;
pub mod types;
pub use error::{ConfigError, ReloadError, WarmloadError};
pub use types::{HostBindings, InProcessHost};

// Re-export lower layers
pub use warmload_config;
pub use warmload_config::{ExclusionPattern, PolicyConfig, SharedPolicy};
pub use warmload_core;
pub use warmload_core::{Disposition, LoadPriority};
pub use warmload_log;

/// Load interception for one host process
pub struct Warmload {
    interceptor: LoadInterceptor,
    config: WarmloadConfig,
}

impl Warmload {
    pub fn new(host: HostBindings, config: WarmloadConfig) -> Self {
        let engine = CompileEngine::new(host.compiler, host.loader, host.suffixes)
            .with_policy(config.policy.clone())
            .with_logger(config.logger.clone());
        let interceptor = LoadInterceptor::new(Arc::new(engine), host.pipeline, host.history);
        Self {
            interceptor,
            config,
        }
    }

    /// Start intercepting loads and sweep files loaded so far
    ///
    /// Returns `None` when interception is already active.
    pub fn enable(&mut self) -> Option<SweepReport> {
        if !self.interceptor.is_active() {
            self.report_invalid_patterns();
        }
        let report = self.interceptor.enable()?;
        info!(
            self.config.logger,
            "Compiled {} of {} previously loaded files",
            report.compiled,
            report.visited
        );
        Some(report)
    }

    /// Stop intercepting loads; reloads already requested still happen
    pub fn disable(&mut self) -> bool {
        self.interceptor.disable()
    }

    pub fn is_active(&self) -> bool {
        self.interceptor.is_active()
    }

    pub fn policy(&self) -> &SharedPolicy {
        &self.config.policy
    }

    pub fn config(&self) -> &WarmloadConfig {
        &self.config
    }

    /// Replace the policy with a JSON policy file
    ///
    /// On error the current policy stays in effect.
    pub fn reload_policy(&self, path: impl AsRef<Path>) -> Result<(), WarmloadError> {
        let path = path.as_ref();
        self.config.policy.reload_from_file(path)?;
        info!(self.config.logger, "Policy reloaded from {}", path.display());
        self.report_invalid_patterns();
        Ok(())
    }

    pub fn is_eligible(&self, path: &Path) -> bool {
        self.interceptor.engine().is_eligible(Some(path))
    }

    /// Compile a single file outside of any load event
    pub fn compile_if_eligible(&self, path: &Path) -> Outcome {
        self.interceptor.engine().compile_if_eligible(Some(path))
    }

    pub fn stats(&self) -> EngineStats {
        self.interceptor.engine().stats()
    }

    fn report_invalid_patterns(&self) {
        self.config.policy.read(|policy| {
            for pattern in policy.invalid_patterns() {
                warn!(
                    self.config.logger,
                    "Exclusion pattern {} is invalid and will never match", pattern
                );
            }
        });
    }
}

impl std::fmt::Debug for Warmload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Warmload")
            .field("interceptor", &self.interceptor)
            .finish()
    }
}
