//! 宿主边界
//!
//! 编译器、产物加载器、加载历史、源码后缀集合以及加载完成观察者列表都属于
//! 宿主进程。这里只定义接口，另附一组进程内参考实现供嵌入和测试使用。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{CompileError, ReloadError};

mod history;
mod pipeline;
mod queue;
mod suffixes;

pub use history::RecordedHistory;
pub use pipeline::{observer, DispatchReport, ObserverPipeline};
pub use queue::{DeferredLoadQueue, RunReport};
pub use suffixes::SharedSuffixes;

/// 源码 → 产物编译器（外部、不透明）
pub trait Compiler: Send + Sync {
    /// 编译 `source`，返回生成的产物路径
    fn compile(&self, source: &Path) -> Result<PathBuf, CompileError>;
}

impl<F> Compiler for F
where
    F: Fn(&Path) -> Result<PathBuf, CompileError> + Send + Sync,
{
    fn compile(&self, source: &Path) -> Result<PathBuf, CompileError> {
        self(source)
    }
}

/// 异步加载请求的紧迫程度
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadPriority {
    Immediate,
    /// 最低紧迫度，不挤占宿主的其他待办工作
    Deferred,
}

/// 产物加载器：把请求交给宿主的异步设施后立即返回
pub trait ArtifactLoader: Send + Sync {
    fn load_artifact_async(&self, artifact: &Path, priority: LoadPriority);
}

/// 真正把产物链接进进程的操作（由异步设施在稍后调用）
pub trait ArtifactLinker: Send + Sync {
    fn link(&self, artifact: &Path) -> Result<(), ReloadError>;
}

impl<F> ArtifactLinker for F
where
    F: Fn(&Path) -> Result<(), ReloadError> + Send + Sync,
{
    fn link(&self, artifact: &Path) -> Result<(), ReloadError> {
        self(artifact)
    }
}

/// 加载历史中的一条记录
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    /// 源文件
    pub source: PathBuf,
    /// 已加载的产物（以解释方式加载时为 `None`）
    pub artifact: Option<PathBuf>,
}

/// 进程启动以来加载过的文件（只读）
pub trait LoadHistory: Send + Sync {
    /// 调用时刻的快照
    fn entries(&self) -> Vec<HistoryEntry>;
}

/// 当前被识别为"可解释源码"的后缀集合，例如 `.el`
///
/// 集合可能在运行时变化，调用方每次都要重新读取。
pub trait SourceSuffixes: Send + Sync {
    fn source_suffixes(&self) -> Vec<String>;
}

/// 一次加载完成事件
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadEvent {
    path: Option<PathBuf>,
}

impl LoadEvent {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// 宿主无法解析出源文件路径的事件
    pub fn unresolved() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// 观察者对事件的处置
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// 已处理：本次加载剩余的完成动作全部跳过
    Handled,
    /// 继续调用后面的观察者
    PassThrough,
}

/// 观察者顺序，数值小的先运行
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(i32);

impl Priority {
    /// 加载拦截器专用，先于所有其他观察者
    ///
    /// 只在本 crate 内可见：宿主无法构造出这个值，这一档只会有拦截钩子。
    pub(crate) const INTERCEPTOR: Priority = Priority(i32::MIN);
    pub const DEFAULT: Priority = Priority(0);

    /// 普通观察者的优先级；永远排在拦截钩子之后
    pub const fn new(value: i32) -> Self {
        if value == i32::MIN {
            Priority(i32::MIN + 1)
        } else {
            Priority(value)
        }
    }

    pub const fn value(self) -> i32 {
        self.0
    }

    /// 是否为拦截钩子专用的一档
    pub const fn is_interceptor(self) -> bool {
        self.0 == i32::MIN
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::DEFAULT
    }
}

/// 注册句柄，用于注销
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(pub u64);

/// 加载完成观察者
pub trait LoadObserver: Send + Sync {
    fn name(&self) -> &str;
    fn on_load(&self, event: &LoadEvent) -> Disposition;
}

/// 宿主的观察者注册接口
pub trait LoadPipeline: Send + Sync {
    /// 按优先级升序运行；[`Priority::is_interceptor`] 为真的注册必须排在最前
    fn register(&self, priority: Priority, observer: Arc<dyn LoadObserver>) -> ObserverId;
    /// 返回该句柄是否仍处于注册状态
    fn unregister(&self, id: ObserverId) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_never_reaches_interceptor_slot() {
        assert!(Priority::INTERCEPTOR < Priority::new(i32::MIN));
        assert!(Priority::INTERCEPTOR.is_interceptor());
        assert!(!Priority::new(i32::MIN).is_interceptor());
        assert!(Priority::new(-5) < Priority::DEFAULT);
        assert_eq!(Priority::default().value(), 0);
    }

    #[test]
    fn test_load_event_path() {
        assert_eq!(LoadEvent::new("/a.el").path(), Some(Path::new("/a.el")));
        assert_eq!(LoadEvent::unresolved().path(), None);
    }

    #[test]
    fn test_closure_compiler() {
        let compiler = |source: &Path| Ok::<_, CompileError>(source.with_extension("eln"));
        assert_eq!(
            Compiler::compile(&compiler, Path::new("/a.el")).unwrap(),
            PathBuf::from("/a.eln")
        );
    }
}
