//! 编译替换引擎
//!
//! 对通过资格过滤的源文件：发出进度通知 → 调用编译器 → 以最低紧迫度请求异步
//! 加载产物。编译失败（包括编译器 panic）在这里就地恢复，只留下一条失败通知，
//! 绝不传播给触发加载的调用方。
//!
//! 每次加载都会无条件重新编译：不按内容哈希或修改时间去重。

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use warmload_config::SharedPolicy;
use warmload_log::{debug, log, trace, warn, Level, Logger};

use crate::error::CompileError;
use crate::filter;
use crate::host::{ArtifactLoader, Compiler, Disposition, LoadPriority, SourceSuffixes};

/// 一次 `compile_if_eligible` 的结果
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// 不符合编译条件，没有任何副作用
    Skipped,
    /// 编译成功，已请求异步加载 `artifact`
    Compiled { artifact: PathBuf },
    /// 编译失败，已发出失败通知，没有请求加载
    CompileFailed { reason: CompileError },
}

impl Outcome {
    pub fn is_compiled(&self) -> bool {
        matches!(self, Outcome::Compiled { .. })
    }

    /// 对原始加载事件的处置：只有编译成功时才抑制剩余的完成动作，
    /// 它们会在产物重新加载时执行
    pub fn disposition(&self) -> Disposition {
        match self {
            Outcome::Compiled { .. } => Disposition::Handled,
            Outcome::Skipped | Outcome::CompileFailed { .. } => Disposition::PassThrough,
        }
    }
}

/// 引擎生命周期内的计数快照
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub skipped: usize,
    pub compiled: usize,
    pub failed: usize,
}

#[derive(Default)]
struct Counters {
    skipped: AtomicUsize,
    compiled: AtomicUsize,
    failed: AtomicUsize,
}

pub struct CompileEngine {
    compiler: Arc<dyn Compiler>,
    loader: Arc<dyn ArtifactLoader>,
    suffixes: Arc<dyn SourceSuffixes>,
    policy: SharedPolicy,
    logger: Arc<Logger>,
    counters: Counters,
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl CompileEngine {
    /// 使用参考策略和静默日志器创建引擎
    pub fn new(
        compiler: Arc<dyn Compiler>,
        loader: Arc<dyn ArtifactLoader>,
        suffixes: Arc<dyn SourceSuffixes>,
    ) -> Self {
        Self {
            compiler,
            loader,
            suffixes,
            policy: SharedPolicy::default(),
            logger: Logger::noop(),
            counters: Counters::default(),
        }
    }

    pub fn with_policy(mut self, policy: SharedPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_logger(mut self, logger: Arc<Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn policy(&self) -> &SharedPolicy {
        &self.policy
    }

    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            skipped: self.counters.skipped.load(Ordering::Relaxed),
            compiled: self.counters.compiled.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    /// 只做资格判定，不编译
    pub fn is_eligible(&self, path: Option<&Path>) -> bool {
        self.policy
            .read(|policy| filter::is_eligible(path, policy, self.suffixes.as_ref()))
    }

    /// 符合条件就编译并请求异步重载
    pub fn compile_if_eligible(&self, path: Option<&Path>) -> Outcome {
        // 策略在每次调用时重新读取
        let mut pattern_errors = Vec::new();
        let (verdict, verbose) = self.policy.read(|policy| {
            let verdict =
                filter::evaluate_reporting(path, policy, self.suffixes.as_ref(), |index, e| {
                    pattern_errors.push((index, e.clone()));
                });
            (verdict, policy.verbose)
        });
        // 读锁释放后再写日志：sink 可能会修改策略
        for (index, e) in &pattern_errors {
            warn!(self.logger, "ignoring exclusion pattern #{}: {}", index, e);
        }

        let source = match path {
            Some(source) if verdict.is_eligible() => source,
            _ => {
                if let Some(p) = path {
                    trace!(self.logger, "Skipping {}: {}", p.display(), verdict);
                }
                self.counters.skipped.fetch_add(1, Ordering::Relaxed);
                return Outcome::Skipped;
            }
        };

        let progress = if verbose { Level::Info } else { Level::Debug };
        log!(self.logger, progress, "Compiling {}", source.display());

        let result = {
            let span = self.logger.enter_span("compile");
            let result = panic::catch_unwind(AssertUnwindSafe(|| self.compiler.compile(source)))
                .unwrap_or_else(|payload| {
                    Err(CompileError::Panicked {
                        path: source.to_path_buf(),
                        message: panic_message(payload),
                    })
                });
            drop(span);
            result
        };

        match result {
            Ok(artifact) => {
                self.loader
                    .load_artifact_async(&artifact, LoadPriority::Deferred);
                debug!(
                    self.logger,
                    "Scheduled deferred load of {} for {}",
                    artifact.display(),
                    source.display()
                );
                self.counters.compiled.fetch_add(1, Ordering::Relaxed);
                Outcome::Compiled { artifact }
            }
            Err(reason) => {
                warn!(self.logger, "Failed to compile {}: {}", source.display(), reason);
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                Outcome::CompileFailed { reason }
            }
        }
    }
}

impl std::fmt::Debug for CompileEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompileEngine")
            .field("policy", &self.policy)
            .field("stats", &self.stats())
            .finish()
    }
}
