//! warmload-log - 结构化日志系统
//!
//! 为加载拦截器设计的日志系统，特点：
//! - **显式传递**：无全局logger，`Arc<Logger>` 通过配置传入每个组件
//! - **非阻塞**：环形缓冲区满了覆盖旧数据
//! - **可观察**：编译进度/失败通知就是日志记录，测试直接从环形缓冲区读取
//! - **可桥接**：`TracingSink` 把记录交给宿主进程的 `tracing` subscriber
//!
//! # 快速开始
//!
//! ```
//! use warmload_log::{info, Level, LogConfig};
//!
//! let (logger, ring) = LogConfig::new(Level::Info).with_ring_buffer(100).init();
//! info!(logger, "Compiling {}", "/home/u/lib/widget.el");
//! assert_eq!(ring.unwrap().len(), 1);
//! ```

mod config;
mod logger;
mod macros;
mod record;
mod ring_buffer;
mod span;

pub use config::{
    install_tracing_subscriber, LogConfig, OutputConfig, TracingFormat, FILE_ENV, LEVEL_ENV,
};
#[cfg(feature = "file")]
pub use logger::FileSink;
#[cfg(feature = "stderr")]
pub use logger::StderrSink;
pub use logger::{LogSink, Logger, SpanGuard, TracingSink};
pub use record::{Level, Record};
pub use ring_buffer::{LogRingBuffer, RingBufferStats};
pub use span::{Span, SpanId};

// 宏通过 #[macro_export] 自动导出到 crate 根：
// trace!, debug!, info!, warn!, error!, log!
