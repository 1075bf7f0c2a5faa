//! 测试辅助工具
//!
//! 一个完整的进程内"宿主"：观察者列表、延迟加载队列、加载历史和记录调用的编译器。

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use warmload_config::{PolicyConfig, SharedPolicy};
use warmload_core::host::{
    observer, DeferredLoadQueue, ObserverPipeline, RecordedHistory, SharedSuffixes,
};
use warmload_core::{
    CompileEngine, CompileError, Compiler, Disposition, LoadInterceptor, LoadPipeline, Priority,
    ReloadError,
};
use warmload_log::{Level, LogRingBuffer, Logger};

/// 记录调用的编译器
///
/// 路径包含 `broken` 时返回编译错误，包含 `explode` 时 panic，
/// 其余把后缀换成 `.eln`。
#[derive(Default)]
pub struct RecordingCompiler {
    calls: Mutex<Vec<PathBuf>>,
}

impl RecordingCompiler {
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Compiler for RecordingCompiler {
    fn compile(&self, source: &Path) -> Result<PathBuf, CompileError> {
        self.calls.lock().unwrap().push(source.to_path_buf());
        let name = source.to_string_lossy();
        if name.contains("explode") {
            panic!("compiler crashed on {}", name);
        }
        if name.contains("broken") {
            return Err(CompileError::Rejected {
                path: source.to_path_buf(),
                message: "end of file during parsing".to_string(),
            });
        }
        Ok(source.with_extension("eln"))
    }
}

/// 测试用宿主
pub struct TestHost {
    pub pipeline: Arc<ObserverPipeline>,
    pub queue: Arc<DeferredLoadQueue>,
    pub history: Arc<RecordedHistory>,
    pub suffixes: Arc<SharedSuffixes>,
    pub compiler: Arc<RecordingCompiler>,
    pub policy: SharedPolicy,
    pub logger: Arc<Logger>,
    pub ring: Arc<LogRingBuffer>,
    pub linked: Arc<Mutex<Vec<PathBuf>>>,
    /// 普通"加载后"动作看到的路径
    pub after_load: Arc<Mutex<Vec<PathBuf>>>,
}

impl TestHost {
    pub fn new(policy: PolicyConfig) -> Self {
        let ring = LogRingBuffer::new(256);
        let logger = Logger::new(Level::Info).with_sink(ring.clone());

        let linked = Arc::new(Mutex::new(Vec::new()));
        let linked_sink = Arc::clone(&linked);
        let linker = move |artifact: &Path| -> Result<(), ReloadError> {
            linked_sink.lock().unwrap().push(artifact.to_path_buf());
            Ok(())
        };

        let host = Self {
            pipeline: Arc::new(ObserverPipeline::with_logger(logger.clone())),
            queue: Arc::new(DeferredLoadQueue::with_logger(
                Arc::new(linker),
                logger.clone(),
            )),
            history: Arc::new(RecordedHistory::new()),
            suffixes: Arc::new(SharedSuffixes::new([".el", ".el.gz"])),
            compiler: Arc::new(RecordingCompiler::default()),
            policy: SharedPolicy::new(policy),
            logger,
            ring,
            linked,
            after_load: Arc::new(Mutex::new(Vec::new())),
        };

        let seen = Arc::clone(&host.after_load);
        host.pipeline.register(
            Priority::DEFAULT,
            observer("after-load", move |event| {
                if let Some(path) = event.path() {
                    seen.lock().unwrap().push(path.to_path_buf());
                }
                Disposition::PassThrough
            }),
        );
        host
    }

    pub fn engine(&self) -> CompileEngine {
        CompileEngine::new(
            self.compiler.clone(),
            self.queue.clone(),
            self.suffixes.clone(),
        )
        .with_policy(self.policy.clone())
        .with_logger(self.logger.clone())
    }

    pub fn interceptor(&self) -> LoadInterceptor {
        LoadInterceptor::new(
            Arc::new(self.engine()),
            self.pipeline.clone(),
            self.history.clone(),
        )
    }

    /// 模拟宿主以解释方式加载一个源文件
    pub fn load(&self, path: &str) -> Disposition {
        self.history.record(path, None);
        let report = self
            .pipeline
            .dispatch(&warmload_core::LoadEvent::new(path));
        if report.was_handled() {
            Disposition::Handled
        } else {
            Disposition::PassThrough
        }
    }

    /// 宿主空闲：执行排队的重载
    pub fn idle(&self) -> usize {
        self.queue.run_pending(&self.pipeline).loaded.len()
    }

    pub fn after_load_paths(&self) -> Vec<PathBuf> {
        self.after_load.lock().unwrap().clone()
    }

    pub fn linked_paths(&self) -> Vec<PathBuf> {
        self.linked.lock().unwrap().clone()
    }

    pub fn compile_notifications(&self) -> usize {
        self.ring.count_matching(Level::Info, "Compiling ")
    }

    pub fn failure_notifications(&self, needle: &str) -> usize {
        self.ring.count_matching(Level::Warn, needle)
    }
}
