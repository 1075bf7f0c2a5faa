//! 日志专用环形缓冲区

use crate::logger::LogSink;
use crate::record::{Level, Record};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// 环形缓冲区统计信息
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RingBufferStats {
    /// 当前记录数
    pub record_count: usize,
    /// 因缓冲区满而丢弃的记录数
    pub dropped_count: usize,
    /// 缓冲区容量
    pub capacity: usize,
}

/// 日志环形缓冲区
///
/// 当缓冲区满时，新记录会覆盖最旧的记录（FIFO）。
/// 除了崩溃转储，它也是测试里观察编译通知的手段。
pub struct LogRingBuffer {
    inner: Mutex<VecDeque<Record>>,
    capacity: usize,
    dropped: AtomicUsize,
}

impl LogRingBuffer {
    /// 创建新的环形缓冲区
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(LogRingBuffer {
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            dropped: AtomicUsize::new(0),
        })
    }

    fn records(&self) -> MutexGuard<'_, VecDeque<Record>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 写入记录（满了则覆盖旧数据）
    fn push(&self, record: Record) {
        if self.capacity == 0 {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }
        let mut inner = self.records();
        if inner.len() >= self.capacity {
            inner.pop_front();
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        inner.push_back(record);
    }

    /// 获取当前所有记录（按时间顺序）
    pub fn dump_records(&self) -> Vec<Record> {
        self.records().iter().cloned().collect()
    }

    /// 统计某个级别下消息包含 `needle` 的记录条数
    pub fn count_matching(&self, level: Level, needle: &str) -> usize {
        self.records()
            .iter()
            .filter(|r| r.level == level && r.message.contains(needle))
            .count()
    }

    /// 将日志转储到字符串
    pub fn dump(&self) -> String {
        self.records()
            .iter()
            .map(|r| r.format())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// 清空缓冲区
    pub fn clear(&self) {
        self.records().clear();
        self.dropped.store(0, Ordering::Relaxed);
    }

    /// 获取统计信息
    pub fn stats(&self) -> RingBufferStats {
        RingBufferStats {
            record_count: self.len(),
            dropped_count: self.dropped_count(),
            capacity: self.capacity,
        }
    }

    /// 获取当前记录数
    pub fn len(&self) -> usize {
        self.records().len()
    }

    /// 检查是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 获取容量
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 获取已丢弃的记录数
    pub fn dropped_count(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl LogSink for LogRingBuffer {
    fn write(&self, record: &Record) {
        self.push(record.clone());
    }
}

impl LogSink for Arc<LogRingBuffer> {
    fn write(&self, record: &Record) {
        self.push(record.clone());
    }
}
