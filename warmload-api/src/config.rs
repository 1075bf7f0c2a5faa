//! API 层配置
//!
//! 包含 WarmloadConfig 和全局单例（供宿主在启动脚本里一次性配置）

use std::path::Path;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use warmload_config::{PolicyConfig, SharedPolicy};
use warmload_log::{LogConfig, Logger};

use crate::error::WarmloadError;

/// Warmload configuration
#[derive(Clone)]
pub struct WarmloadConfig {
    /// Exclusion policy, shared with the running interceptor
    pub policy: SharedPolicy,
    /// Logger for progress and failure notifications
    pub logger: Arc<Logger>,
}

impl WarmloadConfig {
    pub fn new(policy: PolicyConfig) -> Self {
        Self {
            policy: SharedPolicy::new(policy),
            logger: Logger::noop(),
        }
    }

    /// Load the policy from a JSON policy file
    pub fn from_policy_file(path: impl AsRef<Path>) -> Result<Self, WarmloadError> {
        Ok(Self::new(PolicyConfig::from_file(path)?))
    }

    pub fn with_logger(mut self, logger: Arc<Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Reference policy with embedded logging, adjusted by `WARMLOAD_LOG`
    /// (level) and `WARMLOAD_LOG_FILE` (extra log file)
    pub fn from_env() -> Self {
        Self::default().with_log_config(LogConfig::embedded().with_env_overrides())
    }

    /// Build the logger from a [`LogConfig`]
    pub fn with_log_config(self, log: LogConfig) -> Self {
        let (logger, _) = log.init();
        self.with_logger(logger)
    }
}

impl std::fmt::Debug for WarmloadConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WarmloadConfig")
            .field("policy", &self.policy)
            .field("log_level", &self.logger.level())
            .finish()
    }
}

impl Default for WarmloadConfig {
    fn default() -> Self {
        Self::new(PolicyConfig::default())
    }
}

// Global config singleton for hosts that configure once at startup
static GLOBAL_CONFIG: OnceCell<WarmloadConfig> = OnceCell::new();

/// Initialize global configuration
pub fn init(config: WarmloadConfig) -> Result<(), WarmloadError> {
    GLOBAL_CONFIG
        .set(config)
        .map_err(|_| WarmloadError::AlreadyInitialized)
}

/// Get global config reference
pub fn config() -> Option<&'static WarmloadConfig> {
    GLOBAL_CONFIG.get()
}

/// Check if config is initialized
pub fn is_initialized() -> bool {
    GLOBAL_CONFIG.get().is_some()
}
