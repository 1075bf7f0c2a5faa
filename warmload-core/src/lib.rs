//! Warmload Core - 加载拦截与编译替换引擎（纯逻辑）
//!
//! 三个部分：
//! - [`filter`]：资格过滤器，判断一个已加载的源文件是否应该编译
//! - [`engine`]：编译替换引擎，编译并请求异步重载产物
//! - [`interceptor`]：加载拦截器，挂到宿主的加载完成观察者列表上
//!
//! 编译器、加载器、加载历史等都属于宿主，见 [`host`] 中的接口。
//! 配置和日志器通过参数显式传入，不使用全局状态。

pub mod engine;
pub mod error;
pub mod filter;
pub mod host;
pub mod interceptor;

pub use engine::{CompileEngine, EngineStats, Outcome};
pub use error::{CompileError, ReloadError};
pub use filter::Verdict;
pub use host::{
    ArtifactLinker, ArtifactLoader, Compiler, Disposition, HistoryEntry, LoadEvent, LoadHistory,
    LoadObserver, LoadPipeline, LoadPriority, ObserverId, Priority, SourceSuffixes,
};
pub use interceptor::{ActivationState, LoadInterceptor, SweepReport, HOOK_NAME};

// Re-export config types from warmload-config
pub use warmload_config::{ExclusionPattern, PolicyConfig, SharedPolicy};
