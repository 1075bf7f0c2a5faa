//! API 错误类型
//!
//! 编译错误不会出现在这里：它们在引擎内部恢复，只以日志通知的形式出现。

use thiserror::Error;

pub use warmload_config::ConfigError;
pub use warmload_core::ReloadError;

/// Warmload 错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WarmloadError {
    /// 策略文件或排除规则错误
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// 产物重载失败（由宿主的异步设施报告）
    #[error("Reload error: {0}")]
    Reload(#[from] ReloadError),

    /// 全局配置已经初始化过
    #[error("global configuration already initialized")]
    AlreadyInitialized,
}

impl WarmloadError {
    /// 获取错误阶段名称
    pub fn phase(&self) -> &'static str {
        match self {
            WarmloadError::Config(_) => "config",
            WarmloadError::Reload(_) => "reload",
            WarmloadError::AlreadyInitialized => "init",
        }
    }
}
