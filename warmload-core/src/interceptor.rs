//! 加载拦截器
//!
//! 在宿主的加载完成观察者列表最前面挂一个钩子。每个加载事件都交给编译替换
//! 引擎；编译成功时返回 `Handled`，本次加载剩余的完成动作改由产物重载时执行，
//! 所以每个文件的完成动作只运行一次。
//!
//! 启用时还会把进程已经加载过的文件扫一遍（只扫一次）。

use std::path::Path;
use std::sync::Arc;

use warmload_log::{debug, info, Logger};

use crate::engine::{CompileEngine, Outcome};
use crate::host::{
    Disposition, LoadEvent, LoadHistory, LoadObserver, LoadPipeline, ObserverId, Priority,
};

/// 拦截钩子在观察者列表中的名称
pub const HOOK_NAME: &str = "warmload::intercept";

/// 拦截器状态
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ActivationState {
    #[default]
    Inactive,
    /// 已注册钩子，持有注销用的句柄
    Active(ObserverId),
}

impl ActivationState {
    pub fn is_active(&self) -> bool {
        matches!(self, ActivationState::Active(_))
    }
}

/// 启用时对加载历史的扫描结果
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub visited: usize,
    pub compiled: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl SweepReport {
    fn record(&mut self, outcome: &Outcome) {
        self.visited += 1;
        match outcome {
            Outcome::Skipped => self.skipped += 1,
            Outcome::Compiled { .. } => self.compiled += 1,
            Outcome::CompileFailed { .. } => self.failed += 1,
        }
    }
}

struct InterceptHook {
    engine: Arc<CompileEngine>,
}

impl LoadObserver for InterceptHook {
    fn name(&self) -> &str {
        HOOK_NAME
    }

    fn on_load(&self, event: &LoadEvent) -> Disposition {
        self.engine.compile_if_eligible(event.path()).disposition()
    }
}

pub struct LoadInterceptor {
    engine: Arc<CompileEngine>,
    pipeline: Arc<dyn LoadPipeline>,
    history: Arc<dyn LoadHistory>,
    state: ActivationState,
    logger: Arc<Logger>,
}

impl LoadInterceptor {
    pub fn new(
        engine: Arc<CompileEngine>,
        pipeline: Arc<dyn LoadPipeline>,
        history: Arc<dyn LoadHistory>,
    ) -> Self {
        let logger = Arc::clone(engine.logger());
        Self {
            engine,
            pipeline,
            history,
            state: ActivationState::Inactive,
            logger,
        }
    }

    pub fn with_logger(mut self, logger: Arc<Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn state(&self) -> ActivationState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn engine(&self) -> &Arc<CompileEngine> {
        &self.engine
    }

    /// 注册钩子并扫描加载历史
    ///
    /// 已启用时什么都不做，返回 `None`。
    pub fn enable(&mut self) -> Option<SweepReport> {
        if self.state.is_active() {
            debug!(self.logger, "interception already enabled");
            return None;
        }

        let hook = Arc::new(InterceptHook {
            engine: Arc::clone(&self.engine),
        });
        let id = self.pipeline.register(Priority::INTERCEPTOR, hook);
        // 先置为 Active 再扫描：扫描触发的重载事件也要经过钩子
        self.state = ActivationState::Active(id);
        info!(self.logger, "interception enabled");

        Some(self.sweep())
    }

    /// 注销钩子；未启用时返回 `false`
    ///
    /// 已经交给加载器的重载请求不会被取消。
    pub fn disable(&mut self) -> bool {
        let ActivationState::Active(id) = self.state else {
            return false;
        };
        self.state = ActivationState::Inactive;
        if !self.pipeline.unregister(id) {
            debug!(self.logger, "hook {:?} was already removed from the pipeline", id);
        }
        info!(self.logger, "interception disabled");
        true
    }

    fn sweep(&self) -> SweepReport {
        let entries = self.history.entries();
        let _span = self.logger.enter_span("sweep");
        debug!(self.logger, "sweeping {} previously loaded files", entries.len());

        let mut report = SweepReport::default();
        for entry in &entries {
            let outcome = self.engine.compile_if_eligible(Some(entry.source.as_path()));
            report.record(&outcome);
        }

        debug!(
            self.logger,
            "sweep done: {} compiled, {} skipped, {} failed",
            report.compiled,
            report.skipped,
            report.failed
        );
        report
    }

    /// 直接处理一个加载事件，与钩子被宿主调用时的行为相同
    pub fn handle(&self, path: Option<&Path>) -> Disposition {
        self.engine.compile_if_eligible(path).disposition()
    }
}

impl Drop for LoadInterceptor {
    fn drop(&mut self) {
        self.disable();
    }
}

impl std::fmt::Debug for LoadInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadInterceptor")
            .field("state", &self.state)
            .field("engine", &self.engine)
            .finish()
    }
}
