//! 日志配置
//!
//! 提供便捷的日志初始化配置，以及 `tracing-subscriber` 的安装入口。

use crate::logger::TracingSink;
use crate::{Level, LogRingBuffer, Logger};
use std::sync::Arc;
use tracing_subscriber::{filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// 覆盖日志级别的环境变量，取值见 [`Level::parse`]
pub const LEVEL_ENV: &str = "WARMLOAD_LOG";

/// 追加日志文件输出的环境变量
pub const FILE_ENV: &str = "WARMLOAD_LOG_FILE";

/// 日志输出目标配置
#[derive(Clone, Debug, PartialEq)]
pub enum OutputConfig {
    /// 输出到标准错误
    #[cfg(feature = "stderr")]
    Stderr,
    /// 输出到文件（路径）
    #[cfg(feature = "file")]
    File(String),
    /// 输出到环形缓冲区（容量）
    RingBuffer(usize),
    /// 转发给 `tracing`
    Tracing,
}

/// 日志配置
///
/// 用于一键初始化日志系统
///
/// # 示例
///
/// ```
/// use warmload_log::{LogConfig, Level};
///
/// let config = LogConfig::new(Level::Debug).with_ring_buffer(1000);
/// let (logger, ring) = config.init();
/// assert!(ring.is_some());
/// assert_eq!(logger.level(), Level::Debug);
/// ```
#[derive(Clone, Debug)]
pub struct LogConfig {
    /// 日志级别
    pub level: Level,
    /// 输出目标列表
    pub outputs: Vec<OutputConfig>,
}

impl LogConfig {
    /// 创建指定级别、无输出的配置
    pub fn new(level: Level) -> Self {
        LogConfig {
            level,
            outputs: Vec::new(),
        }
    }

    /// 开发环境推荐配置
    ///
    /// - Debug 级别
    /// - 输出到 stderr
    /// - 环形缓冲区 10000 条
    #[cfg(feature = "stderr")]
    pub fn dev() -> Self {
        LogConfig {
            level: Level::Debug,
            outputs: vec![OutputConfig::Stderr, OutputConfig::RingBuffer(10000)],
        }
    }

    /// 嵌入宿主进程时的配置：只报告编译进度与失败，交给 `tracing`
    pub fn embedded() -> Self {
        LogConfig {
            level: Level::Info,
            outputs: vec![OutputConfig::Tracing, OutputConfig::RingBuffer(1000)],
        }
    }

    /// 测试环境配置（静默）
    pub fn test() -> Self {
        LogConfig {
            level: Level::Error,
            outputs: Vec::new(),
        }
    }

    /// 添加 stderr 输出
    #[cfg(feature = "stderr")]
    pub fn with_stderr(mut self) -> Self {
        if !self.outputs.contains(&OutputConfig::Stderr) {
            self.outputs.push(OutputConfig::Stderr);
        }
        self
    }

    /// 添加文件输出
    #[cfg(feature = "file")]
    pub fn with_file(mut self, path: impl Into<String>) -> Self {
        self.outputs.push(OutputConfig::File(path.into()));
        self
    }

    /// 添加环形缓冲区输出
    pub fn with_ring_buffer(mut self, capacity: usize) -> Self {
        self.outputs.push(OutputConfig::RingBuffer(capacity));
        self
    }

    /// 添加 tracing 转发
    pub fn with_tracing(mut self) -> Self {
        if !self.outputs.contains(&OutputConfig::Tracing) {
            self.outputs.push(OutputConfig::Tracing);
        }
        self
    }

    /// 用查询函数覆盖级别与日志文件
    ///
    /// 读取 [`LEVEL_ENV`] 与 [`FILE_ENV`] 两个键；无法识别的级别保持原值。
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(level) = lookup(LEVEL_ENV).as_deref().and_then(Level::parse) {
            self.level = level;
        }
        #[cfg(feature = "file")]
        if let Some(path) = lookup(FILE_ENV).filter(|p| !p.is_empty()) {
            self = self.with_file(path);
        }
        self
    }

    /// 用进程环境变量覆盖级别与日志文件
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// 初始化日志系统
    ///
    /// 返回 (logger, Option<ring_buffer>)。配置了多个环形缓冲区时返回最后一个。
    pub fn init(self) -> (Arc<Logger>, Option<Arc<LogRingBuffer>>) {
        let logger = Logger::new(self.level);
        let mut ring_buffer: Option<Arc<LogRingBuffer>> = None;

        for output in self.outputs {
            match output {
                #[cfg(feature = "stderr")]
                OutputConfig::Stderr => logger.add_sink(crate::StderrSink),
                #[cfg(feature = "file")]
                OutputConfig::File(path) => {
                    // 打不开的日志文件不应阻止宿主进程加载代码
                    if let Ok(sink) = crate::FileSink::new(&path) {
                        logger.add_sink(sink);
                    }
                }
                OutputConfig::RingBuffer(capacity) => {
                    let ring = LogRingBuffer::new(capacity);
                    ring_buffer = Some(Arc::clone(&ring));
                    logger.add_sink(ring);
                }
                OutputConfig::Tracing => logger.add_sink(TracingSink),
            }
        }

        (logger, ring_buffer)
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig::new(Level::Info)
    }
}

/// `tracing` 输出格式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TracingFormat {
    /// 紧凑格式
    Compact,
    /// JSON 格式（工具集成）
    Json,
}

fn tracing_level(level: Level) -> tracing::Level {
    match level {
        Level::Trace => tracing::Level::TRACE,
        Level::Debug => tracing::Level::DEBUG,
        Level::Info => tracing::Level::INFO,
        Level::Warn => tracing::Level::WARN,
        Level::Error => tracing::Level::ERROR,
    }
}

/// 安装全局 `tracing` subscriber，把 [`TracingSink`] 转发的记录写到 stderr
///
/// 宿主已经安装过 subscriber 时不做任何事，返回 `false`。
pub fn install_tracing_subscriber(level: Level, format: TracingFormat) -> bool {
    let targets = Targets::new()
        .with_default(tracing_level(level))
        .with_target("warmload_log", tracing_level(level));

    let layer = match format {
        TracingFormat::Compact => fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
        TracingFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(targets))
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_with_ring_buffer() {
        let (logger, ring) = LogConfig::new(Level::Info).with_ring_buffer(8).init();
        let ring = ring.expect("ring buffer configured");

        logger.log(Level::Info, "test", "hello");
        logger.log(Level::Debug, "test", "filtered");

        assert_eq!(ring.len(), 1);
        assert_eq!(ring.capacity(), 8);
    }

    #[test]
    fn test_init_without_ring_buffer() {
        let (logger, ring) = LogConfig::test().init();
        assert!(ring.is_none());
        assert_eq!(logger.level(), Level::Error);
    }

    #[test]
    fn test_overrides_set_level() {
        let config = LogConfig::embedded().with_overrides(|key| match key {
            LEVEL_ENV => Some("DEBUG".to_string()),
            _ => None,
        });
        assert_eq!(config.level, Level::Debug);

        let config = LogConfig::embedded().with_overrides(|_| Some("chatty".to_string()));
        assert_eq!(config.level, Level::Info);
    }

    #[cfg(feature = "file")]
    #[test]
    fn test_overrides_add_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warmload.log");
        let path_str = path.to_string_lossy().into_owned();

        let config = LogConfig::new(Level::Info).with_overrides(|key| match key {
            FILE_ENV => Some(path_str.clone()),
            _ => None,
        });
        assert!(config.outputs.contains(&OutputConfig::File(path_str.clone())));

        let (logger, _) = config.init();
        logger.log(Level::Warn, "test", "Failed to compile /a.el");
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Failed to compile /a.el"));
    }

    #[test]
    fn test_embedded_preset() {
        let config = LogConfig::embedded();
        assert_eq!(config.level, Level::Info);
        assert!(config.outputs.contains(&OutputConfig::Tracing));
        assert!(config.outputs.contains(&OutputConfig::RingBuffer(1000)));
    }

    #[test]
    fn test_with_tracing_is_idempotent() {
        let config = LogConfig::default().with_tracing().with_tracing();
        assert_eq!(config.outputs, vec![OutputConfig::Tracing]);
    }

    #[cfg(feature = "stderr")]
    #[test]
    fn test_dev_preset() {
        let config = LogConfig::dev().with_stderr();
        assert_eq!(config.level, Level::Debug);
        assert_eq!(
            config
                .outputs
                .iter()
                .filter(|o| **o == OutputConfig::Stderr)
                .count(),
            1
        );
    }

    #[test]
    fn test_install_subscriber_twice() {
        // 第二次安装一定失败（全局 subscriber 只能设置一次），且不 panic
        let first = install_tracing_subscriber(Level::Warn, TracingFormat::Compact);
        let second = install_tracing_subscriber(Level::Warn, TracingFormat::Json);
        assert!(!second || !first);
    }
}
