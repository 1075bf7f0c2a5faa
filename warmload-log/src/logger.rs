//! 日志器实现

use crate::record::{Level, Record};
use crate::span::{Span, SpanId};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// 日志输出目标trait
pub trait LogSink: Send + Sync {
    /// 写入日志记录
    fn write(&self, record: &Record);
}

/// 日志器配置和状态
///
/// 没有全局实例：每个组件持有一个 `Arc<Logger>`，由调用方显式传入。
pub struct Logger {
    /// 当前日志级别（原子存储）
    level: AtomicU8,
    /// 输出目标列表
    sinks: Mutex<Vec<Box<dyn LogSink>>>,
    /// Span栈（用于跟踪嵌套调用）
    span_stack: Mutex<Vec<Span>>,
    /// 下一个Span ID
    next_span_id: AtomicU64,
}

/// 锁中毒时仍然取出数据：日志不应该因为别处的 panic 而失效
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Logger {
    /// 创建新的日志器
    pub fn new(level: Level) -> Arc<Self> {
        Arc::new(Logger {
            level: AtomicU8::new(level as u8),
            sinks: Mutex::new(Vec::new()),
            span_stack: Mutex::new(Vec::new()),
            next_span_id: AtomicU64::new(1),
        })
    }

    /// 添加输出目标
    pub fn with_sink<S: LogSink + 'static>(self: Arc<Self>, sink: S) -> Arc<Self> {
        self.add_sink(sink);
        self
    }

    /// 添加 sink（不消耗 Arc）
    pub fn add_sink<S: LogSink + 'static>(&self, sink: S) {
        lock(&self.sinks).push(Box::new(sink));
    }

    /// 动态设置日志级别
    pub fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    /// 获取当前日志级别
    pub fn level(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Relaxed)).unwrap_or(Level::Info)
    }

    /// 检查指定级别是否启用
    pub fn is_enabled(&self, level: Level) -> bool {
        level >= self.level()
    }

    /// 记录日志（宏的落点）
    #[inline(never)]
    pub fn log(&self, level: Level, target: &'static str, message: impl Into<String>) {
        if !self.is_enabled(level) {
            return;
        }

        let mut record = Record::new(level, target, message);

        if let Some(span) = lock(&self.span_stack).last() {
            record = record.with_span(span.id.0);
        }

        for sink in lock(&self.sinks).iter() {
            sink.write(&record);
        }
    }

    /// 进入一个新的span，返回守卫对象
    pub fn enter_span(self: &Arc<Self>, name: &'static str) -> SpanGuard {
        let id = SpanId(self.next_span_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.span_stack).push(Span::new(id, name));

        SpanGuard {
            logger: Arc::clone(self),
        }
    }

    /// 获取当前span栈深度
    pub fn span_depth(&self) -> usize {
        lock(&self.span_stack).len()
    }

    /// 创建禁用日志的no-op日志器（用于测试或禁用场景）
    pub fn noop() -> Arc<Self> {
        Self::new(Level::Error)
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level())
            .field("sinks", &lock(&self.sinks).len())
            .field("span_depth", &self.span_depth())
            .finish()
    }
}

/// Span守卫，退出时自动弹出span栈
pub struct SpanGuard {
    logger: Arc<Logger>,
}

impl Drop for SpanGuard {
    fn drop(&mut self) {
        lock(&self.logger.span_stack).pop();
    }
}

// 为Arc<Logger>实现LogSink，支持链式日志器
impl LogSink for Arc<Logger> {
    fn write(&self, record: &Record) {
        self.log(record.level, record.target, record.message.clone());
    }
}

/// 标准错误sink
#[cfg(feature = "stderr")]
pub struct StderrSink;

#[cfg(feature = "stderr")]
impl LogSink for StderrSink {
    fn write(&self, record: &Record) {
        eprintln!("{}", record.format());
    }
}

/// 文件sink（追加模式）
#[cfg(feature = "file")]
pub struct FileSink {
    file: Mutex<std::fs::File>,
}

#[cfg(feature = "file")]
impl FileSink {
    /// 打开或创建日志文件
    pub fn new(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        Ok(FileSink {
            file: Mutex::new(file),
        })
    }
}

#[cfg(feature = "file")]
impl LogSink for FileSink {
    #[inline(never)]
    fn write(&self, record: &Record) {
        use std::io::Write;
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{}", record.format());
        }
    }
}

/// 把记录转发给 `tracing`，让宿主进程已有的 subscriber 接管输出
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write(&self, record: &Record) {
        let target = record.target;
        let message = record.message.as_str();
        match record.level {
            Level::Trace => tracing::trace!(log_target = target, span_id = record.span_id, "{message}"),
            Level::Debug => tracing::debug!(log_target = target, span_id = record.span_id, "{message}"),
            Level::Info => tracing::info!(log_target = target, span_id = record.span_id, "{message}"),
            Level::Warn => tracing::warn!(log_target = target, span_id = record.span_id, "{message}"),
            Level::Error => tracing::error!(log_target = target, span_id = record.span_id, "{message}"),
        }
    }
}
