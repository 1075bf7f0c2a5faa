//! 宿主绑定
//!
//! 把宿主一侧的五个接口打包在一起交给 [`Warmload`](crate::Warmload)。

use std::path::PathBuf;
use std::sync::Arc;

use warmload_core::host::{
    DeferredLoadQueue, DispatchReport, ObserverPipeline, RecordedHistory, RunReport,
    SharedSuffixes,
};
use warmload_core::{
    ArtifactLinker, ArtifactLoader, Compiler, LoadEvent, LoadHistory, LoadPipeline,
    SourceSuffixes,
};
use warmload_log::Logger;

/// 宿主提供的全部接口
#[derive(Clone)]
pub struct HostBindings {
    pub compiler: Arc<dyn Compiler>,
    pub loader: Arc<dyn ArtifactLoader>,
    pub suffixes: Arc<dyn SourceSuffixes>,
    pub pipeline: Arc<dyn LoadPipeline>,
    pub history: Arc<dyn LoadHistory>,
}

impl std::fmt::Debug for HostBindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostBindings")
            .field("suffixes", &self.suffixes.source_suffixes())
            .field("history_len", &self.history.entries().len())
            .finish()
    }
}

/// 完全在进程内运行的宿主
///
/// 观察者列表、延迟加载队列、加载历史和后缀集合都用参考实现；编译器和链接器
/// 由调用方提供。
pub struct InProcessHost {
    pub pipeline: Arc<ObserverPipeline>,
    pub queue: Arc<DeferredLoadQueue>,
    pub history: Arc<RecordedHistory>,
    pub suffixes: SharedSuffixes,
}

impl InProcessHost {
    pub fn new<I, S>(linker: Arc<dyn ArtifactLinker>, suffixes: I, logger: Arc<Logger>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pipeline: Arc::new(ObserverPipeline::with_logger(logger.clone())),
            queue: Arc::new(DeferredLoadQueue::with_logger(linker, logger)),
            history: Arc::new(RecordedHistory::new()),
            suffixes: SharedSuffixes::new(suffixes),
        }
    }

    /// 与给定编译器组合成 [`HostBindings`]
    pub fn bindings(&self, compiler: Arc<dyn Compiler>) -> HostBindings {
        HostBindings {
            compiler,
            loader: self.queue.clone(),
            suffixes: Arc::new(self.suffixes.clone()),
            pipeline: self.pipeline.clone(),
            history: self.history.clone(),
        }
    }

    /// 以解释方式加载一个源文件：记入历史并分发加载完成事件
    pub fn load(&self, source: impl Into<PathBuf>) -> DispatchReport {
        let source = source.into();
        self.history.record(source.clone(), None);
        self.pipeline.dispatch(&LoadEvent::new(source))
    }

    /// 执行排队的产物加载
    pub fn idle(&self) -> RunReport {
        self.queue.run_pending(&self.pipeline)
    }
}
