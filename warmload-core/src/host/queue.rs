//! 延迟加载队列：参考的"异步设施"

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use warmload_log::{debug, error, Logger};

use super::{ArtifactLinker, ArtifactLoader, LoadEvent, LoadPriority, ObserverPipeline};
use crate::error::ReloadError;

#[derive(Clone, Debug, PartialEq, Eq)]
struct PendingLoad {
    artifact: PathBuf,
    priority: LoadPriority,
}

/// 一轮 [`DeferredLoadQueue::run_pending`] 的结果
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    /// 成功链接并已分发加载完成事件的产物
    pub loaded: Vec<PathBuf>,
    pub failed: Vec<ReloadError>,
}

/// 把加载请求排队，由宿主在空闲时调用 [`run_pending`](Self::run_pending) 执行
///
/// 执行一个请求 = 链接产物 + 为产物分发一次加载完成事件。`Immediate` 请求插到
/// 队首，`Deferred` 请求排到队尾。
pub struct DeferredLoadQueue {
    pending: Mutex<VecDeque<PendingLoad>>,
    linker: Arc<dyn ArtifactLinker>,
    logger: Arc<Logger>,
}

impl DeferredLoadQueue {
    pub fn new(linker: Arc<dyn ArtifactLinker>) -> Self {
        Self::with_logger(linker, Logger::noop())
    }

    pub fn with_logger(linker: Arc<dyn ArtifactLinker>, logger: Arc<Logger>) -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            linker,
            logger,
        }
    }

    fn pending(&self) -> MutexGuard<'_, VecDeque<PendingLoad>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.pending().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 排队中的请求（按执行顺序）
    pub fn requests(&self) -> Vec<(PathBuf, LoadPriority)> {
        self.pending()
            .iter()
            .map(|p| (p.artifact.clone(), p.priority))
            .collect()
    }

    /// 执行调用时已在队列中的请求
    ///
    /// 执行过程中新加入的请求留到下一轮，避免重载链无限展开。
    pub fn run_pending(&self, pipeline: &ObserverPipeline) -> RunReport {
        let batch = self.len();
        let mut report = RunReport::default();

        for _ in 0..batch {
            // 每次只在取出时持锁：分发可能再次调用 load_artifact_async
            let Some(next) = self.pending().pop_front() else {
                break;
            };

            match self.linker.link(&next.artifact) {
                Ok(()) => {
                    debug!(self.logger, "Loaded {}", next.artifact.display());
                    pipeline.dispatch(&LoadEvent::new(next.artifact.clone()));
                    report.loaded.push(next.artifact);
                }
                Err(e) => {
                    error!(self.logger, "{}", e);
                    report.failed.push(e);
                }
            }
        }
        report
    }
}

impl ArtifactLoader for DeferredLoadQueue {
    fn load_artifact_async(&self, artifact: &Path, priority: LoadPriority) {
        let request = PendingLoad {
            artifact: artifact.to_path_buf(),
            priority,
        };
        let mut pending = self.pending();
        match priority {
            LoadPriority::Immediate => pending.push_front(request),
            LoadPriority::Deferred => pending.push_back(request),
        }
    }
}
